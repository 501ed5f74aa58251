//! Conversion option normalization.
//!
//! The plugin options a site author writes are not what the engine consumes.
//! Before a document is loaded, the options pass through [`normalize`], which
//! fills in the two defaults every site relies on:
//!
//! - **`imagesdir`**: defaults to `/images@` and is always rewritten with the
//!   site's path prefix, so `image::` targets resolve when the site is served
//!   from a sub-path. The trailing `@` makes the value a soft default that a
//!   document may override with its own `:imagesdir:` entry.
//! - **`skip-front-matter`**: defaults to `true` so a leading YAML block is
//!   not rendered as body text. An explicit `false` is preserved.
//!
//! ## Memoization
//!
//! Every document in a build normalizes the same options with the same
//! prefix. [`OptionsCache`] computes the result once per distinct
//! (options, prefix) pair and hands out a shared [`Arc`] afterwards. The
//! key is a SHA-256 hash of the pair's content, not the identity of the
//! objects passed in, so two equal configs loaded separately share an entry.
//! The cache belongs to one build session and is dropped (or
//! [cleared](OptionsCache::clear)) with it.

use crate::config::{ConverterConfig, PluginOptions};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub const IMAGES_DIR: &str = "imagesdir";
pub const SKIP_FRONT_MATTER: &str = "skip-front-matter";

/// Images directory used when the options don't name one. Soft-set.
pub const DEFAULT_IMAGES_DIR: &str = "/images@";

/// A single attribute value as written in the plugin options.
///
/// Asciidoc attributes are strings, but config files naturally contain
/// flags (`skip-front-matter = true`) and numbers (`toclevels = 3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    /// Whether the value counts as "set" when picking a default.
    ///
    /// `false`, `0` and the empty string all fall back to the default.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Flag(b) => *b,
            AttributeValue::Integer(n) => *n != 0,
            AttributeValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Flag(b) => write!(f, "{b}"),
            AttributeValue::Integer(n) => write!(f, "{n}"),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

/// Options handed to the engine for every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionOptions {
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl ConversionOptions {
    /// The resolved `imagesdir`, including any trailing soft-set marker.
    pub fn images_dir(&self) -> Option<&AttributeValue> {
        self.attributes.get(IMAGES_DIR)
    }

    /// Whether a leading front-matter block is skipped by the engine.
    pub fn skips_front_matter(&self) -> bool {
        matches!(
            self.attributes.get(SKIP_FRONT_MATTER),
            Some(AttributeValue::Flag(true)) | Some(AttributeValue::Text(_))
        )
    }
}

/// Prepend `path_prefix` to `url`, collapsing the first doubled slash.
///
/// Only the first `//` is collapsed: `"/a/" + "/b//c"` gives `"/a/b//c"`.
pub fn with_path_prefix(path_prefix: &str, url: &str) -> String {
    format!("{path_prefix}{url}").replacen("//", "/", 1)
}

/// Derive the engine options from plugin options and the site path prefix.
///
/// Works on a copy; the caller's options are left untouched.
pub fn normalize(options: &PluginOptions, path_prefix: &str) -> ConversionOptions {
    let mut attributes = options.attributes.clone().unwrap_or_default();

    let images_dir = match attributes.get(IMAGES_DIR) {
        Some(value) if value.is_truthy() => value.to_string(),
        _ => DEFAULT_IMAGES_DIR.to_string(),
    };
    attributes.insert(
        IMAGES_DIR.to_string(),
        AttributeValue::Text(with_path_prefix(path_prefix, &images_dir)),
    );

    attributes
        .entry(SKIP_FRONT_MATTER.to_string())
        .or_insert(AttributeValue::Flag(true));

    ConversionOptions { attributes }
}

/// Session-scoped memo table for [`normalize`].
#[derive(Debug, Default)]
pub struct OptionsCache {
    entries: Mutex<HashMap<String, Arc<ConversionOptions>>>,
}

impl OptionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the normalized options for this pair, computing them at most once.
    ///
    /// The lock is held while computing so concurrent first lookups of the
    /// same key don't duplicate the work.
    pub fn get_or_normalize(
        &self,
        options: &PluginOptions,
        path_prefix: &str,
    ) -> Arc<ConversionOptions> {
        let key = hash_options(options, path_prefix);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(normalize(options, path_prefix)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// SHA-256 of the plugin options and path prefix.
///
/// Each field is framed with a tag and a NUL separator so adjacent values
/// can't run together into the same byte stream.
pub fn hash_options(options: &PluginOptions, path_prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"prefix\0");
    hasher.update(path_prefix.as_bytes());
    hasher.update(b"\0");

    match &options.file_extensions {
        Some(exts) => {
            hasher.update(b"\x01");
            for ext in exts {
                hasher.update(ext.as_bytes());
                hasher.update(b"\0");
            }
        }
        None => hasher.update(b"\x00"),
    }

    hasher.update([options.defines_empty_attributes as u8]);

    match &options.converter {
        ConverterConfig::Html5 => hasher.update(b"html5\0"),
        ConverterConfig::Command(argv) => {
            hasher.update(b"command\0");
            for arg in argv {
                hasher.update(arg.as_bytes());
                hasher.update(b"\0");
            }
        }
    }

    match &options.attributes {
        Some(attributes) => {
            hasher.update(b"\x01");
            for (name, value) in attributes {
                hasher.update(name.as_bytes());
                hasher.update(b"=");
                match value {
                    AttributeValue::Flag(b) => hasher.update([b'f', *b as u8]),
                    AttributeValue::Integer(n) => {
                        hasher.update(b"i");
                        hasher.update(n.to_le_bytes());
                    }
                    AttributeValue::Text(s) => {
                        hasher.update(b"t");
                        hasher.update(s.as_bytes());
                    }
                }
                hasher.update(b"\0");
            }
        }
        None => hasher.update(b"\x00"),
    }

    format!("{:x}", hasher.finalize())
}
