//! Content-time quote substitution over HTML fragments.
//!
//! [`BulkSubstituter`] rewrites straight quotes in every text node of a
//! fragment, leaving all markup byte-identical. It runs as a content
//! formatter when HTML is set or pasted, so it must never fail: whatever the
//! splitter recognises as text is scanned, everything else passes through.
//!
//! Each text node is scanned on its own. One pass runs per quote table entry
//! (single quotes, then double quotes for the default table), and within a
//! pass every decision is made against the pass's input, so replacing one
//! quote never changes the context seen by the next.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::format::Formatter;
use crate::fragment::Fragment;
use crate::resolve::{Context, Resolver, ScanHeuristic};
use crate::table::QuoteTable;

/// Counts from one bulk call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    /// Text nodes scanned.
    pub text_nodes: usize,
    /// Text nodes left alone because they sit in a skipped element.
    pub skipped_nodes: usize,
    /// Quotes replaced.
    pub replaced: usize,
}

impl std::ops::AddAssign for SubstitutionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.text_nodes += rhs.text_nodes;
        self.skipped_nodes += rhs.skipped_nodes;
        self.replaced += rhs.replaced;
    }
}

/// Replaces straight quotes in the text nodes of HTML fragments.
#[derive(Debug, Clone)]
pub struct BulkSubstituter {
    resolver: Resolver<ScanHeuristic>,
    skip_elements: Vec<SmolStr>,
}

impl BulkSubstituter {
    pub fn new(table: Arc<QuoteTable>) -> Self {
        Self {
            resolver: Resolver::scan(table),
            skip_elements: Vec::new(),
        }
    }

    /// Leave text inside these elements untouched (ASCII case-insensitive).
    pub fn with_skip_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.skip_elements.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn skip_elements(&self) -> &[SmolStr] {
        &self.skip_elements
    }

    pub fn table(&self) -> &QuoteTable {
        self.resolver.table()
    }

    /// Substitute quotes in the text nodes of `html`.
    pub fn substitute(&self, html: &str) -> String {
        self.substitute_with_stats(html).0
    }

    /// Like [`substitute`](Self::substitute), also reporting what was done.
    pub fn substitute_with_stats(&self, html: &str) -> (String, SubstitutionStats) {
        let mut stats = SubstitutionStats::default();
        let mut fragment = Fragment::parse(html, &self.skip_elements);

        for node in fragment.text_nodes_mut() {
            if node.is_skipped() {
                stats.skipped_nodes += 1;
                continue;
            }
            stats.text_nodes += 1;

            let units = node.units();
            let mut chars: Vec<char> = units.iter().map(|unit| unit.ch).collect();
            let replaced = self.rewrite(&mut chars);
            if replaced == 0 {
                continue;
            }
            stats.replaced += replaced;

            // Replaced units are written as the literal curly character;
            // every other unit keeps its original bytes.
            let mut out = String::with_capacity(node.raw().len() + replaced * 2);
            for (unit, ch) in units.iter().zip(&chars) {
                if *ch == unit.ch {
                    out.push_str(&node.raw()[unit.span.clone()]);
                } else {
                    out.push(*ch);
                }
            }
            node.set_raw(out);
        }

        tracing::trace!(
            input_len = html.len(),
            text_nodes = stats.text_nodes,
            skipped_nodes = stats.skipped_nodes,
            replaced = stats.replaced,
            "substituted quotes in fragment"
        );

        (fragment.serialize(), stats)
    }

    /// Substitute quotes in plain text, treated as a single text node.
    pub fn substitute_text(&self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        if self.rewrite(&mut chars) == 0 {
            return text.to_string();
        }
        chars.into_iter().collect()
    }

    /// Run one pass per table entry over `chars`, returning how many quotes
    /// were replaced.
    fn rewrite(&self, chars: &mut [char]) -> usize {
        let mut replaced = 0;

        for (straight, _) in self.resolver.table().iter() {
            let decisions: Vec<(usize, char)> = {
                let current: &[char] = chars;
                current
                    .iter()
                    .enumerate()
                    .filter(|(_, ch)| **ch == straight)
                    .filter_map(|(idx, _)| {
                        let context = Context::around(current, idx);
                        self.resolver
                            .resolve(straight, &context)
                            .map(|curly| (idx, curly))
                    })
                    .collect()
            };

            replaced += decisions.len();
            for (idx, curly) in decisions {
                chars[idx] = curly;
            }
        }

        replaced
    }
}

impl Formatter for BulkSubstituter {
    fn format(&self, html: &str) -> String {
        self.substitute(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::QuotePair;

    fn substituter() -> BulkSubstituter {
        BulkSubstituter::new(Arc::new(QuoteTable::english()))
    }

    fn sub(html: &str) -> String {
        substituter().substitute(html)
    }

    #[test]
    fn test_sentence() {
        assert_eq!(
            sub(r#"He said "hi" to 'them'."#),
            "He said “hi” to ‘them’."
        );
    }

    #[test]
    fn test_open_at_start_of_text() {
        assert_eq!(sub(r#""Start of line."#), "“Start of line.");
    }

    #[test]
    fn test_empty_and_quoteless() {
        assert_eq!(sub(""), "");
        assert_eq!(sub("<p>plain <b>text</b></p>"), "<p>plain <b>text</b></p>");
    }

    #[test]
    fn test_attributes_untouched() {
        assert_eq!(
            sub(r#"<a title="it's" href='/x?q="y"'>it's</a>"#),
            r#"<a title="it's" href='/x?q="y"'>it’s</a>"#
        );
    }

    #[test]
    fn test_comments_untouched() {
        insta::assert_snapshot!(
            sub(r#"<!-- "note" --><p>"ok"</p>"#),
            @r#"<!-- "note" --><p>“ok”</p>"#
        );
    }

    #[test]
    fn test_isolated_quote_closes() {
        assert_eq!(sub(r#"<p>"</p>"#), "<p>”</p>");
        assert_eq!(sub("' "), "’ ");
    }

    #[test]
    fn test_context_stops_at_node_boundary() {
        // The quote after </b> cannot see "word", so it opens.
        assert_eq!(sub("<b>word</b>'s"), "<b>word</b>‘s");
        assert_eq!(sub(r#"<b>"</b>hi""#), "<b>”</b>hi”");
    }

    #[test]
    fn test_adjacent_quotes_use_pass_input() {
        assert_eq!(sub("''"), "‘’");
        assert_eq!(sub(r#"x""y"#), "x””y");
    }

    #[test]
    fn test_single_quotes_pass_first() {
        // The apostrophe after `"` closes because `"` is still straight
        // (and non-blank) when the single-quote pass runs.
        assert_eq!(
            sub(r#""'Hello,' she said""#),
            "“’Hello,’ she said”"
        );
    }

    #[test]
    fn test_line_breaks_bound_context() {
        assert_eq!(sub("word\n\" next"), "word\n” next");
        assert_eq!(sub("Line one.\n'Line two'"), "Line one.\n‘Line two’");
    }

    #[test]
    fn test_character_references() {
        assert_eq!(
            sub("<p>&quot;Hi&quot; &amp; &#39;bye&#x27;</p>"),
            "<p>“Hi” &amp; ‘bye’</p>"
        );
        assert_eq!(sub("a&nbsp;\"x\""), "a&nbsp;“x”");
        assert_eq!(sub("&copy;\""), "&copy;”");
    }

    #[test]
    fn test_every_line_terminator_bounds_context() {
        assert_eq!(sub("a\r'b"), "a\r‘b");
        assert_eq!(sub("a\u{2028}'b"), "a\u{2028}‘b");
        assert_eq!(sub("a\u{2029}\"b\""), "a\u{2029}“b”");
        assert_eq!(sub("a\r\n\""), "a\r\n”");
    }

    #[test]
    fn test_byte_order_mark_is_blank() {
        assert_eq!(sub("\u{FEFF}\"x\""), "\u{FEFF}“x”");
        assert_eq!(sub("x\u{FEFF}'y'"), "x\u{FEFF}‘y’");
    }

    #[test]
    fn test_next_line_is_not_blank() {
        assert_eq!(sub("\u{85}\"x"), "\u{85}”x");
    }

    #[test]
    fn test_numeric_whitespace_references() {
        assert_eq!(sub("a&#32;\"x\""), "a&#32;“x”");
        assert_eq!(sub("a&#x9;'x'"), "a&#x9;‘x’");
        assert_eq!(sub("a&#65;\"x"), "a&#65;”x");
    }

    #[test]
    fn test_references_without_semicolon() {
        assert_eq!(sub("say &quot hi"), "say “ hi");
        assert_eq!(sub("&quotHi&quot"), "“Hi”");
        assert_eq!(sub("a&nbsp\"x\""), "a&nbsp“x”");
        assert_eq!(sub("&amp'x"), "&amp’x");
    }

    #[test]
    fn test_escapable_raw_text_decodes_references() {
        assert_eq!(
            sub("<textarea>it's &quot;x&quot;</textarea>"),
            "<textarea>it’s “x”</textarea>"
        );
        // Tags inside a title are text, so `>` is the quote's neighbour.
        assert_eq!(
            sub("<title>'x' <b>\"y\"</b></title>"),
            "<title>‘x’ <b>”y”</b></title>"
        );
    }

    #[test]
    fn test_raw_text_is_scanned_literally() {
        assert_eq!(
            sub(r#"<script>s = "&quot;";</script>"#),
            "<script>s = “&quot;”;</script>"
        );
    }

    #[test]
    fn test_skip_elements() {
        let substituter = substituter().with_skip_elements(["code", "script"]);
        let (out, stats) =
            substituter.substitute_with_stats("<p>it's <code>'x'</code></p><script>'y'</script>");
        assert_eq!(out, "<p>it’s <code>'x'</code></p><script>'y'</script>");
        assert_eq!(
            stats,
            SubstitutionStats {
                text_nodes: 1,
                skipped_nodes: 2,
                replaced: 1,
            }
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"He said "hi" to 'them'."#,
            "''\"\"'\"",
            "<p title=\"a'b\">'x' \"y\"</p>\n\"",
            "&quot;&apos;",
        ];
        for input in inputs {
            let once = sub(input);
            assert_eq!(sub(&once), once, "input = {input:?}");
        }
    }

    #[test]
    fn test_substitute_text() {
        let substituter = substituter();
        // Markup characters are just text here.
        assert_eq!(substituter.substitute_text("say <b>'x'"), "say <b>’x’");
        assert_eq!(substituter.substitute_text("say 'x'"), "say ‘x’");
        assert_eq!(substituter.substitute_text("&quot;"), "&quot;");
        assert_eq!(substituter.substitute_text("none"), "none");
    }

    #[test]
    fn test_custom_table() {
        let table = QuoteTable::new([('"', QuotePair::new('«', '»'))]).unwrap();
        let substituter = BulkSubstituter::new(Arc::new(table));
        assert_eq!(substituter.substitute(r#""a" 'b'"#), "«a» 'b'");
    }

    #[test]
    fn test_formatter_impl() {
        let formatter: &dyn Formatter = &substituter();
        assert_eq!(formatter.format("<i>'ok'</i>"), "<i>‘ok’</i>");
    }
}
