//! Keypress-time quote substitution.
//!
//! [`LiveInterceptor`] watches keypress events for straight quotes and
//! replaces them at the caret with the curly form chosen by the caret rule.
//! All work happens synchronously inside the event handler. If the host has
//! no active range the keypress is left alone entirely.

use std::sync::Arc;

use crate::resolve::{CaretHeuristic, Context, Resolver};
use crate::surface::{SurfaceEvent, TextSurface};
use crate::table::{QuoteTable, char_for_key_code};

/// A keypress as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    char_code: u32,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(char_code: u32) -> Self {
        Self {
            char_code,
            default_prevented: false,
        }
    }

    /// Keypress for a typed character.
    pub fn from_char(ch: char) -> Self {
        Self::new(ch as u32)
    }

    pub fn char_code(&self) -> u32 {
        self.char_code
    }

    /// Stop the host from inserting the typed character itself.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What the interceptor did with a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not a quote key; the host handles it normally.
    PassThrough,
    /// The straight quote was replaced with `curly`.
    Substituted { straight: char, curly: char },
    /// A quote key arrived but there was no active range. Nothing changed.
    Aborted,
}

impl InputOutcome {
    pub fn is_substituted(&self) -> bool {
        matches!(self, Self::Substituted { .. })
    }
}

/// Anything that reacts to keypresses on a [`TextSurface`].
///
/// This is the listener half of the registration contract; see
/// [`PluginHost`](crate::PluginHost).
pub trait KeyListener {
    fn on_keypress(&self, event: &mut KeyEvent, surface: &mut dyn TextSurface) -> InputOutcome;
}

/// Replaces typed straight quotes with curly quotes at the caret.
#[derive(Debug, Clone)]
pub struct LiveInterceptor {
    resolver: Resolver<CaretHeuristic>,
}

impl LiveInterceptor {
    pub fn new(table: Arc<QuoteTable>) -> Self {
        Self {
            resolver: Resolver::caret(table),
        }
    }

    pub fn table(&self) -> &QuoteTable {
        self.resolver.table()
    }

    /// Handle one keypress.
    ///
    /// On a quote key with an active range: suppresses the default insertion,
    /// replaces the selection with the curly quote, collapses the caret after
    /// it, pushes history and emits [`SurfaceEvent::ContentChanged`], in that
    /// order.
    pub fn handle_keypress<S>(&self, event: &mut KeyEvent, surface: &mut S) -> InputOutcome
    where
        S: TextSurface + ?Sized,
    {
        let Some(straight) =
            char_for_key_code(event.char_code()).filter(|ch| self.table().contains(*ch))
        else {
            return InputOutcome::PassThrough;
        };

        let Some(range) = surface.range() else {
            tracing::warn!(
                char_code = event.char_code(),
                "no active range, leaving quote keypress alone"
            );
            return InputOutcome::Aborted;
        };

        let context = Context::before(range.char_before_start());
        let Some(curly) = self.resolver.resolve(straight, &context) else {
            return InputOutcome::PassThrough;
        };

        tracing::trace!(
            ?straight,
            ?curly,
            prev = ?context.prev,
            start = range.start_offset,
            end = range.end_offset,
            "substituting typed quote"
        );

        event.prevent_default();

        let mut buf = [0u8; 4];
        surface.delete_contents();
        let inserted = surface.insert_text(curly.encode_utf8(&mut buf));
        surface.collapse_after(&inserted);

        surface.push_history();
        surface.emit(SurfaceEvent::ContentChanged);

        InputOutcome::Substituted { straight, curly }
    }
}

impl KeyListener for LiveInterceptor {
    fn on_keypress(&self, event: &mut KeyEvent, surface: &mut dyn TextSurface) -> InputOutcome {
        self.handle_keypress(event, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::QuotePair;
    use crate::{MemorySurface, UndoManager};

    fn interceptor() -> LiveInterceptor {
        LiveInterceptor::new(Arc::new(QuoteTable::english()))
    }

    fn type_char(surface: &mut MemorySurface, ch: char) -> (KeyEvent, InputOutcome) {
        let mut event = KeyEvent::from_char(ch);
        let outcome = interceptor().handle_keypress(&mut event, surface);
        (event, outcome)
    }

    #[test]
    fn test_open_quote_in_empty_field() {
        for (straight, open) in [('"', '“'), ('\'', '‘')] {
            let mut surface = MemorySurface::new("");
            let (event, outcome) = type_char(&mut surface, straight);
            assert!(event.default_prevented());
            assert_eq!(outcome, InputOutcome::Substituted { straight, curly: open });
            assert_eq!(surface.content(), open.to_string());
            assert_eq!(surface.selection(), Some(1..1));
        }
    }

    #[test]
    fn test_close_quote_after_word() {
        let mut surface = MemorySurface::new("don");
        type_char(&mut surface, '\'');
        assert_eq!(surface.content(), "don’");
        assert_eq!(surface.selection(), Some(4..4));
    }

    #[test]
    fn test_open_quote_after_spaces() {
        for text in ["say ", "say\u{A0}"] {
            let mut surface = MemorySurface::new(text);
            type_char(&mut surface, '"');
            assert_eq!(surface.content(), format!("{text}“"));
        }
    }

    #[test]
    fn test_replaces_selection() {
        let mut surface = MemorySurface::new("a word here").with_selection(2..6);
        type_char(&mut surface, '"');
        // Context is the space before the selection, so the quote opens.
        assert_eq!(surface.content(), "a “ here");
        assert_eq!(surface.selection(), Some(3..3));
    }

    #[test]
    fn test_mid_text_caret() {
        let mut surface = MemorySurface::new("it s").with_caret(2);
        type_char(&mut surface, '\'');
        assert_eq!(surface.content(), "it’ s");
        assert_eq!(surface.selection(), Some(3..3));
    }

    #[test]
    fn test_pushes_history_and_emits() {
        let mut surface = MemorySurface::new("x");
        type_char(&mut surface, '"');
        assert_eq!(surface.events(), &[SurfaceEvent::ContentChanged]);
        assert!(surface.can_undo());
    }

    #[test]
    fn test_other_keys_pass_through() {
        let mut surface = MemorySurface::new("abc");
        let (event, outcome) = type_char(&mut surface, 'd');
        assert_eq!(outcome, InputOutcome::PassThrough);
        assert!(!event.default_prevented());
        assert_eq!(surface.content(), "abc");
        assert!(surface.events().is_empty());
    }

    #[test]
    fn test_backtick_is_not_a_quote_key() {
        let mut surface = MemorySurface::new("");
        let (_, outcome) = type_char(&mut surface, '`');
        assert_eq!(outcome, InputOutcome::PassThrough);
    }

    #[test]
    fn test_abort_without_range() {
        let mut surface = MemorySurface::new("don");
        surface.clear_selection();

        let (event, outcome) = type_char(&mut surface, '\'');
        assert_eq!(outcome, InputOutcome::Aborted);
        assert!(!event.default_prevented());
        assert_eq!(surface.content(), "don");
        assert!(surface.events().is_empty());
        assert!(!surface.can_undo());
    }

    #[test]
    fn test_key_missing_from_custom_table_passes_through() {
        let table = QuoteTable::new([('"', QuotePair::new('«', '»'))]).unwrap();
        let interceptor = LiveInterceptor::new(Arc::new(table));

        let mut surface = MemorySurface::new("x");
        let mut event = KeyEvent::from_char('\'');
        assert_eq!(
            interceptor.handle_keypress(&mut event, &mut surface),
            InputOutcome::PassThrough
        );

        let mut event = KeyEvent::from_char('"');
        interceptor.handle_keypress(&mut event, &mut surface);
        assert_eq!(surface.content(), "x»");
    }

    #[test]
    fn test_dyn_listener() {
        let listener: Box<dyn KeyListener> = Box::new(interceptor());
        let mut surface = MemorySurface::new("");
        let mut event = KeyEvent::from_char('"');
        let outcome = listener.on_keypress(&mut event, &mut surface);
        assert!(outcome.is_substituted());
        assert_eq!(surface.content(), "“");
    }
}
