//! Snapshot undo/redo history.
//!
//! Surfaces that push "the current state" after each change (rather than
//! recording individual edits) fit this model: the top of the undo stack is
//! always the present state, and undoing steps back to the entry below it.

/// Undo and redo over a surface's recorded states.
///
/// `undo` and `redo` restore the surface itself; they return `false` when
/// there is no state to move to.
pub trait UndoManager {
    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;

    fn undo(&mut self) -> bool;

    fn redo(&mut self) -> bool;

    /// Forget every recorded state except the present one.
    fn clear_history(&mut self);
}

/// Bounded stack of snapshots with redo support.
#[derive(Debug, Clone)]
pub struct History<S> {
    undo_stack: Vec<S>,
    redo_stack: Vec<S>,
    max_steps: usize,
}

impl<S: Clone + PartialEq> History<S> {
    /// Start a history whose only entry is `initial`.
    ///
    /// `max_steps` bounds how many undos are possible; it is clamped to at
    /// least one.
    pub fn new(initial: S, max_steps: usize) -> Self {
        Self {
            undo_stack: vec![initial],
            redo_stack: Vec::new(),
            max_steps: max_steps.max(1),
        }
    }

    /// Record `snapshot` as the present state.
    ///
    /// Pushing a snapshot equal to the present one is a no-op. Any new state
    /// clears the redo stack.
    pub fn push(&mut self, snapshot: S) {
        if self.undo_stack.last() == Some(&snapshot) {
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push(snapshot);

        // The present state plus `max_steps` earlier ones.
        while self.undo_stack.len() > self.max_steps + 1 {
            self.undo_stack.remove(0);
        }
    }

    /// The present state.
    pub fn current(&self) -> Option<&S> {
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back, returning the state to restore.
    pub fn undo(&mut self) -> Option<&S> {
        if !self.can_undo() {
            return None;
        }
        let present = self.undo_stack.pop()?;
        self.redo_stack.push(present);
        self.undo_stack.last()
    }

    /// Step forward, returning the state to restore.
    pub fn redo(&mut self) -> Option<&S> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next);
        self.undo_stack.last()
    }

    /// Forget everything except the present state.
    pub fn clear(&mut self) {
        self.redo_stack.clear();
        let keep = self.undo_stack.len().saturating_sub(1);
        self.undo_stack.drain(..keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = History::new("a", 100);
        assert!(!history.can_undo());

        history.push("ab");
        assert!(history.can_undo());

        assert_eq!(history.undo(), Some(&"a"));
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert_eq!(history.redo(), Some(&"ab"));
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&"ab"));
    }

    #[test]
    fn test_duplicate_push_is_noop() {
        let mut history = History::new("a", 100);
        history.push("a");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut history = History::new("a", 100);
        history.push("ab");
        history.undo();
        assert!(history.can_redo());

        history.push("ac");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_steps() {
        let mut history = History::new(0, 2);
        history.push(1);
        history.push(2);
        history.push(3); // evicts 0

        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(&1));
    }

    #[test]
    fn test_clear_keeps_present() {
        let mut history = History::new(0, 10);
        history.push(1);
        history.push(2);
        history.undo();
        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&1));
    }
}
