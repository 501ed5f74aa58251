//! Custom page attributes.
//!
//! Authors attach arbitrary metadata to a page with attribute entries whose
//! names start with `page-`:
//!
//! ```text
//! = Release Notes
//! :page-tags: [release, changelog]
//! :page-order: 3
//! :page-draft:
//! ```
//!
//! [`extract_page_attributes`] strips the prefix and decodes each value as
//! YAML, giving `{tags: ["release", "changelog"], order: 3, draft: ...}`.
//!
//! ## Empty values
//!
//! `:page-draft:` declares the attribute with no value. The engine stores
//! that as the empty string. With `defines_empty_attributes` enabled (the
//! default), such a field becomes [`PageValue::Empty`] and its name is added
//! to the build's [`EmptyAttributeNames`], which downstream schema inference
//! reads to learn that the field exists even when no page gives it a value.
//! With the flag off, the empty string is decoded like any other value and
//! becomes null.
//!
//! A value that is not valid YAML fails the whole document.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Attribute name prefix that marks a custom page attribute.
pub const PAGE_ATTRIBUTE_PREFIX: &str = "page-";

/// The value the engine gives an attribute declared without content.
pub const EMPTY_ATTRIBUTE_VALUE: &str = "";

/// A decoded `page-*` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PageValue {
    /// Declared on purpose with no content.
    Empty,
    /// YAML-decoded value.
    Value(serde_json::Value),
}

impl Serialize for PageValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageValue::Empty => serializer.serialize_str(EMPTY_ATTRIBUTE_VALUE),
            PageValue::Value(value) => value.serialize(serializer),
        }
    }
}

/// Field name (prefix stripped) → decoded value.
pub type PageAttributes = BTreeMap<String, PageValue>;

#[derive(Error, Debug)]
#[error("invalid value for page attribute `{name}`: {source}")]
pub struct PageAttributeError {
    pub name: String,
    #[source]
    pub source: serde_yaml::Error,
}

/// Names of page attributes that were declared empty, across all documents.
///
/// Shared by every document of a build session; insertion order and
/// duplicates don't matter.
#[derive(Debug, Default)]
pub struct EmptyAttributeNames {
    names: Mutex<BTreeSet<String>>,
}

impl EmptyAttributeNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name. Returns `true` if it was not already present.
    pub fn insert(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Sorted snapshot of the recorded names.
    pub fn names(&self) -> Vec<String> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collect the `page-*` attributes of a document.
pub fn extract_page_attributes(
    attributes: &BTreeMap<String, String>,
    defines_empty_attributes: bool,
    empty_names: &EmptyAttributeNames,
) -> Result<PageAttributes, PageAttributeError> {
    let mut page_attributes = PageAttributes::new();

    for (key, value) in attributes {
        let Some(field_name) = key.strip_prefix(PAGE_ATTRIBUTE_PREFIX) else {
            continue;
        };

        let field_value = if value == EMPTY_ATTRIBUTE_VALUE && defines_empty_attributes {
            empty_names.insert(field_name);
            PageValue::Empty
        } else {
            let decoded = decode_value(value).map_err(|source| PageAttributeError {
                name: field_name.to_string(),
                source,
            })?;
            PageValue::Value(decoded)
        };
        page_attributes.insert(field_name.to_string(), field_value);
    }

    Ok(page_attributes)
}

/// Decode an attribute value as YAML. Blank input is null.
pub fn decode_value(raw: &str) -> Result<serde_json::Value, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_yaml::from_str(raw)
}
