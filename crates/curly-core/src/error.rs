//! Error types for curly-core.
//!
//! Substitution itself never fails: the live path passes through or aborts,
//! and the bulk path degrades on malformed markup. Errors only arise when a
//! caller builds a custom quote table.

use miette::Diagnostic;

/// Errors raised while building a custom [`QuoteTable`](crate::QuoteTable).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum TableError {
    /// No straight quotes were given.
    #[error("quote table has no entries")]
    #[diagnostic(
        code(curly::table::empty),
        help("declare at least one straight quote with its open and close forms")
    )]
    Empty,

    /// The same straight quote was declared twice.
    #[error("straight quote {0:?} is declared more than once")]
    #[diagnostic(code(curly::table::duplicate))]
    Duplicate(char),

    /// A replacement character is itself one of the straight quotes, so a
    /// later pass would scan it again.
    #[error("replacement {curly:?} for {straight:?} is itself a straight quote in the table")]
    #[diagnostic(
        code(curly::table::rescan),
        help("replacement characters must not be keys of the same table")
    )]
    Rescan { straight: char, curly: char },
}
