//! YAML front matter.
//!
//! A document may open with a fenced YAML block:
//!
//! ```text
//! ---
//! layout: post
//! tags: [a, b]
//! ---
//! = Title
//! ```
//!
//! The block is read here independently of the engine's own attribute
//! handling; the record keeps both views side by side and never merges
//! them. The opening fence must be the very first line and be exactly
//! `---` (a `----` listing delimiter is not front matter).
//!
//! An opening fence without a closing one is handled two ways:
//!
//! - [`parse`] reads the rest of the file as the YAML block and leaves the
//!   content empty, like the gray-matter reader sites commonly use;
//! - [`split`], used by the engine to skip front matter, reports no block at
//!   all, so the document is parsed whole as Asciidoctor does.

use serde_json::{Map, Value};
use thiserror::Error;

const FENCE: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Raw content split into body and front-matter data.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    /// Everything after the closing fence (or the whole input).
    pub content: String,
    /// Decoded front matter; an empty object when absent.
    pub data: Value,
}

/// Byte offset where the YAML starts, when `raw` opens with a fence.
fn yaml_start(raw: &str) -> Option<usize> {
    let first_end = raw.find('\n').unwrap_or(raw.len());
    (raw[..first_end].trim_end() == FENCE).then(|| (first_end + 1).min(raw.len()))
}

/// Split `raw` into `(yaml, content)` when it starts with a closed front-matter block.
pub fn split(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let start = yaml_start(raw)?;
    let mut offset = start;
    for line in raw[start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &raw[start..offset];
            let content = &raw[offset + line.len()..];
            return Some((yaml, content));
        }
        offset += line.len();
    }
    None
}

/// Parse front matter out of raw document content.
///
/// An unclosed block runs to the end of the file.
pub fn parse(raw: &str) -> Result<FrontMatter, FrontMatterError> {
    let unprefixed = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let block = split(raw).or_else(|| yaml_start(unprefixed).map(|start| (&unprefixed[start..], "")));
    let Some((yaml, content)) = block else {
        return Ok(FrontMatter {
            content: raw.to_string(),
            data: Value::Object(Map::new()),
        });
    };

    let data = if yaml.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Value::Object(Map::new()),
            value => value,
        }
    };

    Ok(FrontMatter {
        content: content.to_string(),
        data,
    })
}
