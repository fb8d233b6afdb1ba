//! Straight-to-curly quote mapping.
//!
//! A [`QuoteTable`] pairs each straight quote with its opening and closing
//! typographic forms. Entry order is significant: the bulk path runs one pass
//! per entry, in order, so the default table substitutes single quotes before
//! double quotes.

use crate::error::TableError;
use crate::resolve::Direction;

/// `‘`
pub const OPEN_SINGLE: char = '\u{2018}';
/// `’`
pub const CLOSE_SINGLE: char = '\u{2019}';
/// `“`
pub const OPEN_DOUBLE: char = '\u{201C}';
/// `”`
pub const CLOSE_DOUBLE: char = '\u{201D}';

/// Key codes the live path recognises, as reported by a keypress `charCode`.
pub const KEY_CODES: [(u32, char); 2] = [(34, '"'), (39, '\'')];

/// Look up the straight quote for a keypress character code.
///
/// Any code outside [`KEY_CODES`] returns `None`.
pub fn char_for_key_code(code: u32) -> Option<char> {
    KEY_CODES
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, ch)| *ch)
}

/// Opening and closing forms of one straight quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub open: char,
    pub close: char,
}

impl QuotePair {
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    /// The curly form for the given direction.
    pub fn get(self, direction: Direction) -> char {
        match direction {
            Direction::Open => self.open,
            Direction::Close => self.close,
        }
    }
}

/// Immutable mapping from straight quotes to their curly pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTable {
    entries: Vec<(char, QuotePair)>,
}

impl Default for QuoteTable {
    fn default() -> Self {
        Self::english()
    }
}

impl QuoteTable {
    /// Build a table from `(straight, pair)` entries, in pass order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the table is empty, declares a straight
    /// quote twice, or maps a quote to a character that is itself a key.
    pub fn new(entries: impl IntoIterator<Item = (char, QuotePair)>) -> Result<Self, TableError> {
        let entries: Vec<(char, QuotePair)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(TableError::Empty);
        }

        for (idx, (straight, _)) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|(seen, _)| seen == straight) {
                return Err(TableError::Duplicate(*straight));
            }
        }

        for (straight, pair) in &entries {
            for curly in [pair.open, pair.close] {
                if entries.iter().any(|(key, _)| *key == curly) {
                    return Err(TableError::Rescan {
                        straight: *straight,
                        curly,
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// English quotes: `'` → `‘’`, then `"` → `“”`.
    pub fn english() -> Self {
        Self {
            entries: vec![
                ('\'', QuotePair::new(OPEN_SINGLE, CLOSE_SINGLE)),
                ('"', QuotePair::new(OPEN_DOUBLE, CLOSE_DOUBLE)),
            ],
        }
    }

    pub fn pair(&self, straight: char) -> Option<QuotePair> {
        self.entries
            .iter()
            .find(|(key, _)| *key == straight)
            .map(|(_, pair)| *pair)
    }

    /// Whether `ch` is one of the straight quotes this table substitutes.
    pub fn contains(&self, ch: char) -> bool {
        self.entries.iter().any(|(key, _)| *key == ch)
    }

    pub fn curly(&self, straight: char, direction: Direction) -> Option<char> {
        self.pair(straight).map(|pair| pair.get(direction))
    }

    /// Entries in pass order.
    pub fn iter(&self) -> impl Iterator<Item = (char, QuotePair)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
