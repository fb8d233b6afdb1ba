//! Quote direction heuristics.
//!
//! Whether a straight quote opens or closes is decided from a tiny window of
//! surrounding text. Two rules exist, one per delivery path:
//!
//! - [`CaretHeuristic`]: used while typing. Only the character before the
//!   caret is known.
//! - [`ScanHeuristic`]: used when scanning whole text nodes. Both neighbours
//!   are known.
//!
//! Neither rule looks at markup structure. A quote at the edge of a text node
//! only sees that node's own characters, so the apostrophe in
//! `<em>word</em>'s` is treated as if it began the text and opens. This is an
//! accepted inaccuracy of the scan rule.

use std::sync::Arc;

use crate::table::QuoteTable;

/// U+00A0 NO-BREAK SPACE.
pub const NON_BREAKING_SPACE: char = '\u{A0}';

/// Opening or closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Open,
    Close,
}

/// Characters adjacent to a quote candidate.
///
/// `None` means there is no character on that side (edge of the text, or a
/// line break), which is not the same as whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Context {
    pub prev: Option<char>,
    pub next: Option<char>,
}

impl Context {
    pub fn new(prev: Option<char>, next: Option<char>) -> Self {
        Self { prev, next }
    }

    /// Context for the caret rule, which only knows the preceding character.
    pub fn before(prev: Option<char>) -> Self {
        Self { prev, next: None }
    }

    /// One-character window around `chars[index]`.
    ///
    /// Line terminators never count as context: a quote right after a line
    /// break sees no previous character at all.
    pub fn around(chars: &[char], index: usize) -> Self {
        let prev = index
            .checked_sub(1)
            .and_then(|i| chars.get(i))
            .copied()
            .filter(|c| !is_line_terminator(*c));
        let next = chars
            .get(index + 1)
            .copied()
            .filter(|c| !is_line_terminator(*c));
        Self { prev, next }
    }
}

/// Characters that end a line for the purpose of the scan window.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whitespace as the scan rule understands it.
///
/// Unicode whitespace except U+0085 NEXT LINE, plus U+FEFF, which editors
/// commonly leave behind as a zero-width marker. NEL is an ordinary
/// character here: it neither ends a line nor counts as blank.
pub fn is_blank(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

/// A rule deciding quote direction from its [`Context`].
pub trait DirectionHeuristic {
    fn direction(&self, context: &Context) -> Direction;
}

/// Keypress rule: close after anything but a space, no-break space, or the
/// start of the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaretHeuristic;

impl DirectionHeuristic for CaretHeuristic {
    fn direction(&self, context: &Context) -> Direction {
        match context.prev {
            Some(c) if c != ' ' && c != NON_BREAKING_SPACE => Direction::Close,
            _ => Direction::Open,
        }
    }
}

/// Text scan rule.
///
/// Closes when the previous character is non-blank, or when there is no
/// previous character and nothing non-blank follows. Everything else opens.
///
/// The second clause means a quote standing entirely alone (no neighbours)
/// closes, while the caret rule would open it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanHeuristic;

impl DirectionHeuristic for ScanHeuristic {
    fn direction(&self, context: &Context) -> Direction {
        let text_before = context.prev.is_some_and(|c| !is_blank(c));
        let blank_after = context.next.is_none_or(is_blank);

        if text_before || (context.prev.is_none() && blank_after) {
            Direction::Close
        } else {
            Direction::Open
        }
    }
}

/// Resolves straight quotes to curly ones with a fixed table and rule.
#[derive(Debug, Clone)]
pub struct Resolver<H> {
    table: Arc<QuoteTable>,
    heuristic: H,
}

impl Resolver<CaretHeuristic> {
    pub fn caret(table: Arc<QuoteTable>) -> Self {
        Self::new(table, CaretHeuristic)
    }
}

impl Resolver<ScanHeuristic> {
    pub fn scan(table: Arc<QuoteTable>) -> Self {
        Self::new(table, ScanHeuristic)
    }
}

impl<H: DirectionHeuristic> Resolver<H> {
    pub fn new(table: Arc<QuoteTable>, heuristic: H) -> Self {
        Self { table, heuristic }
    }

    pub fn table(&self) -> &QuoteTable {
        &self.table
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Curly replacement for `straight` in `context`.
    ///
    /// Returns `None` if `straight` is not a key of the table.
    pub fn resolve(&self, straight: char, context: &Context) -> Option<char> {
        let pair = self.table.pair(straight)?;
        Some(pair.get(self.heuristic.direction(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(prev: Option<char>, next: Option<char>) -> Context {
        Context::new(prev, next)
    }

    #[test]
    fn test_caret_opens_at_start() {
        assert_eq!(CaretHeuristic.direction(&Context::before(None)), Direction::Open);
    }

    #[test]
    fn test_caret_opens_after_spaces() {
        assert_eq!(CaretHeuristic.direction(&Context::before(Some(' '))), Direction::Open);
        assert_eq!(
            CaretHeuristic.direction(&Context::before(Some(NON_BREAKING_SPACE))),
            Direction::Open
        );
    }

    #[test]
    fn test_caret_closes_after_anything_else() {
        for prev in ['t', '.', '(', '\t', '\n', '“'] {
            assert_eq!(
                CaretHeuristic.direction(&Context::before(Some(prev))),
                Direction::Close,
                "prev = {prev:?}"
            );
        }
    }

    #[test]
    fn test_scan_closes_after_text() {
        assert_eq!(ScanHeuristic.direction(&ctx(Some('i'), Some(' '))), Direction::Close);
        assert_eq!(ScanHeuristic.direction(&ctx(Some('n'), Some('t'))), Direction::Close);
        assert_eq!(ScanHeuristic.direction(&ctx(Some('.'), None)), Direction::Close);
    }

    #[test]
    fn test_scan_opens_after_whitespace() {
        assert_eq!(ScanHeuristic.direction(&ctx(Some(' '), Some('h'))), Direction::Open);
        assert_eq!(ScanHeuristic.direction(&ctx(Some(' '), Some(' '))), Direction::Open);
        assert_eq!(ScanHeuristic.direction(&ctx(Some('\t'), None)), Direction::Open);
    }

    #[test]
    fn test_scan_opens_at_start_before_text() {
        assert_eq!(ScanHeuristic.direction(&ctx(None, Some('S'))), Direction::Open);
    }

    #[test]
    fn test_scan_closes_when_isolated() {
        assert_eq!(ScanHeuristic.direction(&ctx(None, None)), Direction::Close);
        assert_eq!(ScanHeuristic.direction(&ctx(None, Some(' '))), Direction::Close);
    }

    #[test]
    fn test_blank_characters() {
        for c in [' ', '\t', '\u{A0}', '\u{2003}', '\u{3000}', '\u{FEFF}'] {
            assert!(is_blank(c), "{c:?}");
        }
        for c in ['a', '"', '\u{85}', '\u{200B}'] {
            assert!(!is_blank(c), "{c:?}");
        }
    }

    #[test]
    fn test_scan_treats_next_line_as_text() {
        assert_eq!(ScanHeuristic.direction(&ctx(Some('\u{85}'), Some('x'))), Direction::Close);
        assert_eq!(ScanHeuristic.direction(&ctx(Some('\u{FEFF}'), Some('x'))), Direction::Open);
    }

    #[test]
    fn test_context_around_stops_at_every_line_terminator() {
        for terminator in ['\n', '\r', '\u{2028}', '\u{2029}'] {
            let chars: Vec<char> = format!("a{terminator}'{terminator}b").chars().collect();
            assert_eq!(Context::around(&chars, 2), Context::new(None, None), "{terminator:?}");
        }

        let chars: Vec<char> = "a\u{85}'".chars().collect();
        assert_eq!(Context::around(&chars, 2), Context::new(Some('\u{85}'), None));
    }

    #[test]
    fn test_context_around_stops_at_line_breaks() {
        let chars: Vec<char> = "a\n'\nb".chars().collect();
        assert_eq!(Context::around(&chars, 2), Context::new(None, None));

        let chars: Vec<char> = "a 'b".chars().collect();
        assert_eq!(Context::around(&chars, 2), Context::new(Some(' '), Some('b')));
        assert_eq!(Context::around(&chars, 0), Context::new(None, Some(' ')));
        assert_eq!(Context::around(&chars, 3), Context::new(Some('\''), None));
    }

    #[test]
    fn test_resolver() {
        let table = Arc::new(QuoteTable::english());
        let caret = Resolver::caret(table.clone());
        let scan = Resolver::scan(table);

        assert_eq!(caret.resolve('"', &Context::before(Some('x'))), Some('”'));
        assert_eq!(caret.resolve('\'', &Context::before(None)), Some('‘'));
        assert_eq!(scan.resolve('"', &ctx(None, Some('S'))), Some('“'));
        assert_eq!(scan.resolve('`', &ctx(None, None)), None);
    }
}
