//! Headless text surface.
//!
//! `MemorySurface` is a single-text-node editing surface backed by a ropey
//! rope, with a snapshot history and an event log. It lets the live path run
//! without a browser: tests drive it directly and the CLI replays keystrokes
//! into it.

use std::ops::Range;

use crate::history::{History, UndoManager};
use crate::surface::{InsertedText, SelectionRange, SurfaceEvent, TextSurface};

const DEFAULT_MAX_STEPS: usize = 100;

/// State captured by [`TextSurface::push_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    text: String,
    selection: Option<Range<usize>>,
}

/// Rope-backed [`TextSurface`].
///
/// All offsets are in chars. The selection is `None` when the surface has no
/// active range (e.g. it lost focus).
#[derive(Debug, Clone)]
pub struct MemorySurface {
    rope: ropey::Rope,
    selection: Option<Range<usize>>,
    history: History<Snapshot>,
    events: Vec<SurfaceEvent>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemorySurface {
    /// Create a surface holding `text` with the caret at the end.
    pub fn new(text: &str) -> Self {
        let rope = ropey::Rope::from_str(text);
        let end = rope.len_chars();
        let selection = Some(end..end);
        let history = History::new(
            Snapshot {
                text: text.to_string(),
                selection: selection.clone(),
            },
            DEFAULT_MAX_STEPS,
        );

        Self {
            rope,
            selection,
            history,
            events: Vec::new(),
        }
    }

    /// Bound the number of undo steps kept.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.history = History::new(self.snapshot(), max_steps);
        self
    }

    pub fn with_caret(self, offset: usize) -> Self {
        self.with_selection(offset..offset)
    }

    pub fn with_selection(mut self, range: Range<usize>) -> Self {
        self.set_selection(range);
        self
    }

    /// Select `range`, clamped to the document and normalized.
    pub fn set_selection(&mut self, range: Range<usize>) {
        let len = self.rope.len_chars();
        let start = range.start.min(range.end).min(len);
        let end = range.start.max(range.end).min(len);
        self.selection = Some(start..end);
    }

    /// Drop the active range.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Insert `text` at the caret without quote handling, as a host does for
    /// ordinary keys.
    pub fn type_plain(&mut self, text: &str) {
        if self.selection.is_none() {
            return;
        }
        self.delete_contents();
        let inserted = self.insert_text(text);
        self.collapse_after(&inserted);
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    /// Take and clear the event log.
    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.rope.to_string(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rope = ropey::Rope::from_str(&snapshot.text);
        self.selection = snapshot.selection;
    }
}

impl TextSurface for MemorySurface {
    fn range(&self) -> Option<SelectionRange> {
        let selection = self.selection.as_ref()?;
        Some(SelectionRange::new(
            self.rope.to_string(),
            selection.start,
            selection.end,
        ))
    }

    fn delete_contents(&mut self) {
        let Some(selection) = self.selection.clone() else {
            return;
        };
        if !selection.is_empty() {
            self.rope.remove(selection.clone());
        }
        self.selection = Some(selection.start..selection.start);
    }

    fn insert_text(&mut self, text: &str) -> InsertedText {
        let start = self
            .selection
            .as_ref()
            .map_or(self.rope.len_chars(), |s| s.start);
        self.rope.insert(start, text);

        let len = text.chars().count();
        // Like a DOM range after insertNode: it now spans the new text.
        self.selection = Some(start..start + len);
        InsertedText { start, len }
    }

    fn replace_range(&mut self, start: usize, end: usize) {
        self.set_selection(start..end);
    }

    fn push_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    fn emit(&mut self, event: SurfaceEvent) {
        self.events.push(event);
    }
}

impl UndoManager for MemorySurface {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl From<&str> for MemorySurface {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
