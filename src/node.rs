//! Node types exchanged with the host.
//!
//! A [`SourceNode`] is a file the host knows about. For every source node
//! with a supported extension the transform creates one [`DocumentRecord`]
//! and links it to the source node as its child.
//!
//! ## Identity and digests
//!
//! Node ids are derived from a seed string with SHA-256 and printed in UUID
//! form, so the same seed always gives the same id across builds:
//!
//! ```text
//! "{source id} >>> ASCIIDOC"  →  "3f0c2a9e-5d1b-5c47-8a66-0e2f1b9d7c11"
//! ```
//!
//! The content digest is the SHA-256 of the record's JSON serialization,
//! taken after every other field is filled in. The digest field itself is
//! left out of the serialization while it is unset.

use crate::engine::{AuthorInfo, RevisionInfo};
use crate::pages::PageAttributes;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// `internal.type` of every record this crate creates.
pub const NODE_TYPE: &str = "Asciidoc";

/// `internal.mediaType` of the record body.
pub const MEDIA_TYPE: &str = "text/html";

/// Appended to the source node id to seed the record id.
pub const ID_SEED_SUFFIX: &str = " >>> ASCIIDOC";

/// A file known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNode {
    pub id: String,
    /// Extension without the dot, as found on disk.
    pub extension: String,
    /// Set for nodes backed by a file.
    pub absolute_path: Option<PathBuf>,
    /// Path relative to the content root, `/`-separated.
    pub relative_path: String,
}

/// Host bookkeeping for a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Internal {
    #[serde(rename = "type")]
    pub node_type: String,
    pub media_type: String,
    /// Raw source with any front matter removed.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
}

/// Title parts and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub main: Option<String>,
    pub description: Option<String>,
}

/// The node created for one Asciidoc document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub parent: String,
    pub children: Vec<String>,
    pub internal: Internal,
    pub html: String,
    pub document: DocumentInfo,
    pub revision: Option<RevisionInfo>,
    pub author: Option<AuthorInfo>,
    pub page_attributes: PageAttributes,
    pub frontmatter: serde_json::Value,
}

/// Parent → child edge registered alongside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentLink {
    pub parent: String,
    pub child: String,
}

/// Deterministic node id for a seed string, in UUID form.
pub fn node_id(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"node\0");
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    // Version 5 / RFC 4122 variant bits so the id reads as a name-based UUID.
    bytes[6] = (bytes[6] & 0x0f) | 0x50;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// SHA-256 hex digest of a value's JSON serialization.
pub fn content_digest<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
