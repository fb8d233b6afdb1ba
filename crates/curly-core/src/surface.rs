//! Host editing surface abstraction.
//!
//! The live path never owns the editor. It borrows the host's caret,
//! selection, undo stack and event bus through [`TextSurface`] for the
//! duration of one keypress and keeps no reference afterwards. A browser host
//! implements it over the DOM Selection API; [`MemorySurface`](crate::MemorySurface)
//! implements it over a rope for headless use.

/// The active range as reported by the host.
///
/// Offsets are character offsets (Unicode scalar values) into
/// `container_text`, the text content of the range's common containing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    pub container_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn new(container_text: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            container_text: container_text.into(),
            start_offset,
            end_offset,
        }
    }

    /// A collapsed range (caret) at `offset`.
    pub fn caret(container_text: impl Into<String>, offset: usize) -> Self {
        Self::new(container_text, offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Character immediately before the range start, if any.
    pub fn char_before_start(&self) -> Option<char> {
        let idx = self.start_offset.checked_sub(1)?;
        self.container_text.chars().nth(idx)
    }

    /// Character immediately after the range end, if any.
    pub fn char_after_end(&self) -> Option<char> {
        self.container_text.chars().nth(self.end_offset)
    }
}

/// Handle to text inserted by [`TextSurface::insert_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedText {
    /// Character offset where the text starts.
    pub start: usize,
    /// Length in characters.
    pub len: usize,
}

impl InsertedText {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Notifications the core sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Content was changed outside the host's own input handling.
    ContentChanged,
}

/// Capabilities the live path needs from the host editor.
///
/// Mutating methods are infallible: by the time the core calls them it has
/// already obtained an active range, which is the only point where the host
/// may refuse.
pub trait TextSurface {
    /// The current range, or `None` if the surface has no active selection.
    fn range(&self) -> Option<SelectionRange>;

    /// Remove the contents of the current range, collapsing it to its start.
    fn delete_contents(&mut self);

    /// Insert `text` at the start of the current range.
    fn insert_text(&mut self, text: &str) -> InsertedText;

    /// Make `start..end` the active range.
    fn replace_range(&mut self, start: usize, end: usize);

    /// Push the current state onto the host's undo stack.
    fn push_history(&mut self);

    /// Deliver a notification to the host.
    fn emit(&mut self, event: SurfaceEvent);

    /// Collapse the active range to just after `inserted`.
    fn collapse_after(&mut self, inserted: &InsertedText) {
        let end = inserted.end();
        self.replace_range(end, end);
    }
}
