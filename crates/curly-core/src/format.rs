//! Content formatters.
//!
//! Hosts run a list of formatters over HTML that is set programmatically or
//! pasted, in registration order. [`FormatterPipeline`] is that list.

use std::fmt;

/// Transforms incoming HTML.
///
/// Formatters run inside the host's content-set and paste flows and must not
/// panic; on input they cannot handle they return it unchanged.
pub trait Formatter {
    fn format(&self, html: &str) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> String,
{
    fn format(&self, html: &str) -> String {
        self(html)
    }
}

/// Ordered list of formatters.
#[derive(Default)]
pub struct FormatterPipeline {
    formatters: Vec<Box<dyn Formatter>>,
}

impl fmt::Debug for FormatterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterPipeline")
            .field("len", &self.formatters.len())
            .finish()
    }
}

impl FormatterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a formatter; it runs after every formatter already present.
    pub fn push(&mut self, formatter: Box<dyn Formatter>) {
        self.formatters.push(formatter);
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Run every formatter over `html`, each on the previous one's output.
    pub fn run(&self, html: &str) -> String {
        self.formatters
            .iter()
            .fold(html.to_string(), |acc, formatter| formatter.format(&acc))
    }
}
