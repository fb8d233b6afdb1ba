//! Plugin wiring.
//!
//! [`CurlyQuotes`] binds one quote table and option set, and hands out the
//! live interceptor and bulk substituter built from it. [`install`] registers
//! both with a host through the narrow [`PluginHost`] contract.
//!
//! [`install`]: CurlyQuotes::install

use std::sync::Arc;

use smol_str::SmolStr;

use crate::bulk::BulkSubstituter;
use crate::format::Formatter;
use crate::live::{KeyListener, LiveInterceptor};
use crate::table::QuoteTable;

/// Plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Quotes to substitute, in bulk pass order.
    pub table: QuoteTable,
    /// Elements whose text the bulk path leaves alone.
    pub skip_elements: Vec<SmolStr>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: QuoteTable) -> Self {
        self.table = table;
        self
    }

    pub fn skip_element(mut self, name: impl Into<SmolStr>) -> Self {
        self.skip_elements.push(name.into());
        self
    }
}

/// Registration contract offered by a host editor.
pub trait PluginHost {
    /// Listen for keypresses on the editable surface.
    fn add_key_listener(&mut self, listener: Box<dyn KeyListener>);

    /// Append to the host's ordered list of content formatters.
    fn push_formatter(&mut self, formatter: Box<dyn Formatter>);
}

/// Curly quote plugin bound to a quote table.
#[derive(Debug, Clone)]
pub struct CurlyQuotes {
    table: Arc<QuoteTable>,
    skip_elements: Vec<SmolStr>,
}

impl Default for CurlyQuotes {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl CurlyQuotes {
    pub fn new(options: Options) -> Self {
        Self {
            table: Arc::new(options.table),
            skip_elements: options.skip_elements,
        }
    }

    pub fn table(&self) -> &QuoteTable {
        &self.table
    }

    /// Keypress-time substitution.
    pub fn live(&self) -> LiveInterceptor {
        LiveInterceptor::new(self.table.clone())
    }

    /// Content-time substitution.
    pub fn bulk(&self) -> BulkSubstituter {
        BulkSubstituter::new(self.table.clone()).with_skip_elements(self.skip_elements.clone())
    }

    /// Register the live interceptor and the bulk formatter with `host`.
    pub fn install<H: PluginHost + ?Sized>(&self, host: &mut H) {
        host.add_key_listener(Box::new(self.live()));
        host.push_formatter(Box::new(self.bulk()));

        tracing::debug!(
            quotes = self.table.len(),
            skip_elements = ?self.skip_elements,
            "installed curly quotes"
        );
    }
}
