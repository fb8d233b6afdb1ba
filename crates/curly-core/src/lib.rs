//! curly-core: typographic quote substitution for rich-text editors.
//!
//! Straight quotes (`"`, `'`) become curly quotes (`“” ‘’`) along two paths
//! that share one direction heuristic:
//! - `LiveInterceptor` - replaces a quote as it is typed, using the
//!   character before the caret
//! - `BulkSubstituter` - rewrites every text node of an HTML fragment when
//!   content is set or pasted, never touching markup
//!
//! The host editor is reached only through the `TextSurface` and
//! `PluginHost` traits. `MemorySurface` is a headless implementation for
//! tests and tools.

pub mod bulk;
pub mod error;
pub mod format;
pub mod fragment;
pub mod history;
pub mod live;
pub mod memory;
pub mod plugin;
pub mod resolve;
pub mod surface;
pub mod table;

pub use bulk::{BulkSubstituter, SubstitutionStats};
pub use error::TableError;
pub use format::{Formatter, FormatterPipeline};
pub use fragment::{Fragment, Node, TextKind, TextNode};
pub use history::{History, UndoManager};
pub use live::{InputOutcome, KeyEvent, KeyListener, LiveInterceptor};
pub use memory::MemorySurface;
pub use plugin::{CurlyQuotes, Options, PluginHost};
pub use resolve::{
    CaretHeuristic, Context, Direction, DirectionHeuristic, Resolver, ScanHeuristic,
};
pub use smol_str::SmolStr;
pub use surface::{InsertedText, SelectionRange, SurfaceEvent, TextSurface};
pub use table::{KEY_CODES, QuotePair, QuoteTable, char_for_key_code};
