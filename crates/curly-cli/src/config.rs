//! KDL configuration.
//!
//! ```kdl
//! quote "'" open="‘" close="’"
//! quote "\"" open="“" close="”"
//! skip "code" "pre"
//! ```
//!
//! `quote` nodes replace the default table, in the order given. `skip` nodes
//! add elements whose text is left alone.

use std::path::{Path, PathBuf};

use curly_core::{Options, QuotePair, QuoteTable, SmolStr, TableError};
use kdl::{KdlDocument, KdlNode};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("could not read config file {}", path.display())]
    #[diagnostic(code(curly::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid KDL in {}", path.display())]
    #[diagnostic(code(curly::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: kdl::KdlError,
    },

    #[error("`{node}` node: {reason}")]
    #[diagnostic(
        code(curly::config::node),
        help("expected e.g. quote \"'\" open=\"‘\" close=\"’\" or skip \"code\"")
    )]
    Node { node: String, reason: &'static str },

    #[error("unknown config node `{0}`")]
    #[diagnostic(code(curly::config::unknown), help("known nodes are `quote` and `skip`"))]
    Unknown(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),
}

/// `<config dir>/curly/config.kdl`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("curly").join("config.kdl"))
}

/// Load options from `path`, or from the default location when `path` is
/// `None`. A missing default file yields the default options; a missing
/// explicit file is an error.
pub fn load(path: Option<&Path>) -> Result<Options, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_path().filter(|path| path.exists()) {
            Some(path) => path,
            None => {
                tracing::debug!("no config file, using defaults");
                return Ok(Options::default());
            }
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let doc: KdlDocument = text.parse().map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    let options = parse(&doc)?;
    tracing::debug!(path = %path.display(), ?options, "loaded config");
    Ok(options)
}

/// Build options from a parsed document.
pub fn parse(doc: &KdlDocument) -> Result<Options, ConfigError> {
    let mut quotes = Vec::new();
    let mut options = Options::default();

    for node in doc.nodes() {
        match node.name().value() {
            "quote" => quotes.push(quote(node)?),
            "skip" => {
                for entry in node.entries() {
                    let name = entry
                        .value()
                        .as_string()
                        .filter(|_| entry.name().is_none())
                        .ok_or_else(|| node_error("skip", "element names must be strings"))?;
                    options = options.skip_element(SmolStr::new(name));
                }
            }
            other => return Err(ConfigError::Unknown(other.to_string())),
        }
    }

    if !quotes.is_empty() {
        options = options.with_table(QuoteTable::new(quotes)?);
    }
    Ok(options)
}

fn quote(node: &KdlNode) -> Result<(char, QuotePair), ConfigError> {
    let mut straight = None;
    let mut open = None;
    let mut close = None;

    for entry in node.entries() {
        let value = entry
            .value()
            .as_string()
            .and_then(single_char)
            .ok_or_else(|| node_error("quote", "values must be single-character strings"))?;

        match entry.name().map(|name| name.value()) {
            None => straight = Some(value),
            Some("open") => open = Some(value),
            Some("close") => close = Some(value),
            Some(_) => return Err(node_error("quote", "only `open` and `close` are allowed")),
        }
    }

    match (straight, open, close) {
        (Some(straight), Some(open), Some(close)) => Ok((straight, QuotePair::new(open, close))),
        _ => Err(node_error("quote", "needs a straight quote, `open` and `close`")),
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

fn node_error(node: &str, reason: &'static str) -> ConfigError {
    ConfigError::Node {
        node: node.to_string(),
        reason,
    }
}
