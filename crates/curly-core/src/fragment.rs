//! Best-effort HTML fragment splitting.
//!
//! Splits a fragment into markup and text nodes without building a DOM.
//! Markup (tags with their attributes, comments, doctypes, processing
//! instructions) is kept as opaque byte slices and reserialized verbatim, so
//! only text node content can ever change.
//!
//! This is not a conforming HTML tokenizer. It knows enough to:
//! - skip quoted attribute values when looking for the end of a tag
//! - treat `<` that does not start a tag as text
//! - keep `script`/`style` and friends as a single raw text node
//! - resolve character references in text for context purposes
//!
//! Anything it cannot make sense of is left in place untouched.

use std::borrow::Cow;
use std::ops::Range;

use memchr::memchr;
use smol_str::SmolStr;

/// Elements whose content is raw text: no markup, no character references.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Elements whose content is text with character references but no markup.
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// Elements that never have content, so can never be "open".
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// How the characters of a text node are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Ordinary text: character references are recognised.
    Data,
    /// Raw text element content: every byte is literal.
    Raw,
}

/// A leaf of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode<'a> {
    raw: Cow<'a, str>,
    kind: TextKind,
    skipped: bool,
}

/// One character of a text node, with the source bytes it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// The character this unit stands for (decoded for references).
    pub ch: char,
    /// Byte range in the node's raw text.
    pub span: Range<usize>,
}

impl<'a> TextNode<'a> {
    pub fn new(raw: impl Into<Cow<'a, str>>, kind: TextKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
            skipped: false,
        }
    }

    /// Serialized form of the node.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    /// Whether the node sits inside an element the caller asked to skip.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Replace the serialized form of the node.
    pub fn set_raw(&mut self, raw: String) {
        self.raw = Cow::Owned(raw);
    }

    /// Characters of the node as a DOM would see them.
    pub fn units(&self) -> Vec<TextUnit> {
        let raw: &str = &self.raw;
        let mut units = Vec::with_capacity(raw.len());
        let mut pos = 0;

        while pos < raw.len() {
            let rest = &raw[pos..];
            if self.kind == TextKind::Data && rest.starts_with('&') {
                if let Some((ch, len)) = decode_reference(rest) {
                    units.push(TextUnit {
                        ch,
                        span: pos..pos + len,
                    });
                    pos += len;
                    continue;
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            let len = ch.len_utf8();
            units.push(TextUnit {
                ch,
                span: pos..pos + len,
            });
            pos += len;
        }

        units
    }
}

/// A piece of a fragment, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// Tag, comment, doctype or other markup, kept byte-for-byte.
    Markup(&'a str),
    Text(TextNode<'a>),
}

/// A fragment split into markup and text nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Fragment<'a> {
    /// Split `html` into nodes.
    ///
    /// Text nodes that are descendants of an element named in `skip` (ASCII
    /// case-insensitive) are flagged with [`TextNode::is_skipped`].
    pub fn parse(html: &'a str, skip: &[SmolStr]) -> Self {
        Splitter::new(html, skip).run()
    }

    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    /// Text nodes in document order.
    pub fn text_nodes_mut(&mut self) -> impl Iterator<Item = &mut TextNode<'a>> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Text(text) => Some(text),
            Node::Markup(_) => None,
        })
    }

    /// Join the nodes back into markup.
    pub fn serialize(&self) -> String {
        let len = self
            .nodes
            .iter()
            .map(|node| match node {
                Node::Markup(markup) => markup.len(),
                Node::Text(text) => text.raw().len(),
            })
            .sum();

        let mut out = String::with_capacity(len);
        for node in &self.nodes {
            match node {
                Node::Markup(markup) => out.push_str(markup),
                Node::Text(text) => out.push_str(text.raw()),
            }
        }
        out
    }
}

/// Single-pass splitter state.
struct Splitter<'a, 's> {
    html: &'a str,
    skip: &'s [SmolStr],
    /// Names of currently open elements from `skip`.
    open_skipped: Vec<SmolStr>,
    nodes: Vec<Node<'a>>,
    /// Start of the pending text run.
    text_start: usize,
}

impl<'a, 's> Splitter<'a, 's> {
    fn new(html: &'a str, skip: &'s [SmolStr]) -> Self {
        Self {
            html,
            skip,
            open_skipped: Vec::new(),
            nodes: Vec::new(),
            text_start: 0,
        }
    }

    fn run(mut self) -> Fragment<'a> {
        let html = self.html;
        let bytes = html.as_bytes();
        let mut pos = 0;

        while let Some(offset) = memchr(b'<', &bytes[pos..]) {
            let lt = pos + offset;
            match self.markup_at(lt) {
                Some(markup) => {
                    self.flush_text(lt);
                    pos = self.push_markup(lt, markup);
                }
                None => pos = lt + 1,
            }
        }

        self.flush_text(bytes.len());
        Fragment { nodes: self.nodes }
    }

    /// Classify the markup starting at `lt`, or `None` if the `<` is text.
    fn markup_at(&self, lt: usize) -> Option<Markup> {
        let rest = &self.html.as_bytes()[lt..];
        match rest.get(1)? {
            b'!' if rest.starts_with(b"<!--") => Some(Markup::Comment),
            b'!' | b'?' => Some(Markup::Bogus),
            b'/' => match rest.get(2)? {
                c if c.is_ascii_alphabetic() => Some(Markup::EndTag),
                _ => Some(Markup::Bogus),
            },
            c if c.is_ascii_alphabetic() => Some(Markup::StartTag),
            _ => None,
        }
    }

    /// Emit the markup at `lt` and return the position after it.
    fn push_markup(&mut self, lt: usize, markup: Markup) -> usize {
        let html = self.html;
        let bytes = html.as_bytes();
        let end = match markup {
            Markup::Comment => comment_end(bytes, lt),
            Markup::Bogus => memchr(b'>', &bytes[lt..]).map_or(bytes.len(), |i| lt + i + 1),
            Markup::StartTag | Markup::EndTag => tag_end(bytes, lt),
        };

        self.nodes.push(Node::Markup(&html[lt..end]));
        self.text_start = end;

        match markup {
            Markup::StartTag => self.open_element(lt + 1, end),
            Markup::EndTag => {
                let name = tag_name(bytes, lt + 2);
                self.close_element(&name);
                end
            }
            Markup::Comment | Markup::Bogus => end,
        }
    }

    /// Handle the effects of a start tag whose name begins at `name_start`.
    /// Returns the position to resume scanning from.
    fn open_element(&mut self, name_start: usize, tag_end: usize) -> usize {
        let name = tag_name(self.html.as_bytes(), name_start);

        let raw_kind = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            Some(TextKind::Raw)
        } else if ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            Some(TextKind::Data)
        } else {
            None
        };

        if let Some(kind) = raw_kind {
            return self.raw_text(&name, kind, tag_end);
        }

        if !VOID_ELEMENTS.contains(&name.as_str()) && self.is_skip(&name) {
            self.open_skipped.push(name);
        }
        tag_end
    }

    fn close_element(&mut self, name: &str) {
        if let Some(idx) = self.open_skipped.iter().rposition(|open| open == name) {
            self.open_skipped.truncate(idx);
        }
    }

    /// Consume the content of a raw text element as one text node.
    fn raw_text(&mut self, name: &SmolStr, kind: TextKind, start: usize) -> usize {
        let html = self.html;
        let bytes = html.as_bytes();
        let end = if name.as_str() == "plaintext" {
            bytes.len()
        } else {
            find_end_tag(bytes, start, name.as_bytes()).unwrap_or(bytes.len())
        };

        let skipped = self.is_skip(name) || !self.open_skipped.is_empty();
        if end > start {
            let mut node = TextNode::new(&html[start..end], kind);
            node.skipped = skipped;
            self.nodes.push(Node::Text(node));
        }
        self.text_start = end;
        end
    }

    fn flush_text(&mut self, end: usize) {
        let html = self.html;
        if end > self.text_start {
            let mut node = TextNode::new(&html[self.text_start..end], TextKind::Data);
            node.skipped = !self.open_skipped.is_empty();
            self.nodes.push(Node::Text(node));
        }
        self.text_start = end;
    }

    fn is_skip(&self, name: &str) -> bool {
        self.skip.iter().any(|s| s.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    StartTag,
    EndTag,
    Comment,
    /// `<!DOCTYPE ...>`, `<?...>`, `<![CDATA[...>`, `</ ...>` and similar.
    Bogus,
}

/// Lowercased tag name starting at `start`.
fn tag_name(bytes: &[u8], start: usize) -> SmolStr {
    let end = bytes[start..]
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/' || *b == b'>')
        .map_or(bytes.len(), |i| start + i);
    let name = String::from_utf8_lossy(&bytes[start..end]);
    SmolStr::new(name.to_ascii_lowercase())
}

/// End of the tag starting at `lt` (one past `>`), skipping quoted attribute
/// values. An unterminated tag runs to the end of input.
fn tag_end(bytes: &[u8], lt: usize) -> usize {
    let mut i = lt + 1;
    let mut after_equals = false;

    while i < bytes.len() {
        match bytes[i] {
            b'>' => return i + 1,
            b'=' => after_equals = true,
            quote @ (b'"' | b'\'') if after_equals => {
                match memchr(quote, &bytes[i + 1..]) {
                    Some(close) => i += close + 1,
                    None => return bytes.len(),
                }
                after_equals = false;
            }
            b if b.is_ascii_whitespace() => {}
            _ => after_equals = false,
        }
        i += 1;
    }

    bytes.len()
}

/// End of the comment starting at `lt`. Handles the abrupt `<!-->` and
/// `<!--->` forms; an unterminated comment runs to the end of input.
fn comment_end(bytes: &[u8], lt: usize) -> usize {
    let body = lt + 4;
    let rest = &bytes[body..];
    if rest.starts_with(b">") {
        return body + 1;
    }
    if rest.starts_with(b"->") {
        return body + 2;
    }

    rest.windows(3)
        .position(|w| w == b"-->")
        .map_or(bytes.len(), |i| body + i + 3)
}

/// Position of `</name` (case-insensitive, followed by a tag delimiter) at
/// or after `from`.
fn find_end_tag(bytes: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    let mut pos = from;
    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let lt = pos + offset;
        let name_start = lt + 2;
        let name_end = name_start + name.len();

        let matches = bytes.get(lt + 1) == Some(&b'/')
            && bytes
                .get(name_start..name_end)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && bytes
                .get(name_end)
                .is_none_or(|b| b.is_ascii_whitespace() || *b == b'/' || *b == b'>');

        if matches {
            return Some(lt);
        }
        pos = lt + 1;
    }
    None
}

/// Decode a character reference at the start of `s`.
///
/// Returns the character and the byte length of the reference. Only
/// references that matter for quote context are decoded by name; every
/// numeric reference is decoded. Anything else returns `None` and is read as
/// literal text.
///
/// As in HTML text content, the legacy names (`&quot`, `&amp`, `&lt`, `&gt`,
/// `&nbsp`) and numeric references are also accepted without the trailing
/// `;`.
pub fn decode_reference(s: &str) -> Option<(char, usize)> {
    const NAMED: &[(&str, char)] = &[
        ("&quot;", '"'),
        ("&QUOT;", '"'),
        ("&apos;", '\''),
        ("&amp;", '&'),
        ("&AMP;", '&'),
        ("&lt;", '<'),
        ("&LT;", '<'),
        ("&gt;", '>'),
        ("&GT;", '>'),
        ("&nbsp;", '\u{A0}'),
        ("&Tab;", '\t'),
        ("&NewLine;", '\n'),
    ];

    const LEGACY: &[(&str, char)] = &[
        ("&quot", '"'),
        ("&QUOT", '"'),
        ("&amp", '&'),
        ("&AMP", '&'),
        ("&lt", '<'),
        ("&LT", '<'),
        ("&gt", '>'),
        ("&GT", '>'),
        ("&nbsp", '\u{A0}'),
    ];

    if let Some((name, ch)) = NAMED
        .iter()
        .chain(LEGACY)
        .find(|(name, _)| s.starts_with(name))
    {
        return Some((*ch, name.len()));
    }

    let digits = s.strip_prefix("&#")?;
    let (radix, digits, prefix_len) = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => (16, hex, 3),
        None => (10, digits, 2),
    };

    let count = digits
        .bytes()
        .take_while(|b| (*b as char).is_digit(radix))
        .count();
    if count == 0 {
        return None;
    }
    let terminator = usize::from(digits.as_bytes().get(count) == Some(&b';'));

    let value = digits[..count].chars().try_fold(0u32, |acc, c| {
        let digit = c.to_digit(radix)?;
        acc.checked_mul(radix)?.checked_add(digit)
    });
    let ch = value
        .filter(|v| *v != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);

    Some((ch, prefix_len + count + terminator))
}
