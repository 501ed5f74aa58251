//! Host services used by the transform.
//!
//! The transform never touches the filesystem or the node graph directly.
//! Everything it needs from the surrounding build goes through [`Host`]:
//! loading content, deriving ids and digests, registering nodes and links,
//! and reporting a failure that must stop the build.
//!
//! [`NodeStore`] is the in-process host the CLI uses. It collects records,
//! links and fatal reports behind mutexes so one store can serve every
//! worker of a parallel build.

use crate::node::{self, DocumentRecord, ParentLink, SourceNode};
use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no content available for node {0}")]
    NoContent(String),
    #[error("could not serialize node: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Services the build provides to the transform.
pub trait Host: Send + Sync {
    /// Raw text of a source node.
    fn load_node_content(&self, node: &SourceNode) -> Result<String, HostError>;

    /// Stable id derived from a seed string.
    fn create_node_id(&self, seed: &str) -> String;

    /// Digest of a fully assembled record.
    fn create_content_digest(&self, record: &DocumentRecord) -> Result<String, HostError>;

    fn create_node(&self, record: DocumentRecord);

    fn create_parent_child_link(&self, parent: &SourceNode, child: &DocumentRecord);

    /// Record a failure that fails the build once all documents have run.
    fn panic_on_build(&self, message: &str);
}

/// In-memory host: reads files from disk, keeps created nodes in memory.
#[derive(Debug, Default)]
pub struct NodeStore {
    contents: HashMap<String, String>,
    records: Mutex<Vec<DocumentRecord>>,
    links: Mutex<Vec<ParentLink>>,
    fatal: Mutex<Vec<String>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for the node with this id instead of reading a file.
    pub fn with_content(mut self, node_id: &str, content: &str) -> Self {
        self.contents.insert(node_id.to_string(), content.to_string());
        self
    }

    /// Created records, in creation order.
    pub fn records(&self) -> Vec<DocumentRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn links(&self) -> Vec<ParentLink> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fatal reports, in the order they were raised.
    pub fn fatal_errors(&self) -> Vec<String> {
        self.fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take ownership of everything collected.
    pub fn into_parts(self) -> (Vec<DocumentRecord>, Vec<ParentLink>, Vec<String>) {
        (
            self.records.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.links.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.fatal.into_inner().unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Host for NodeStore {
    fn load_node_content(&self, node: &SourceNode) -> Result<String, HostError> {
        if let Some(content) = self.contents.get(&node.id) {
            return Ok(content.clone());
        }
        match &node.absolute_path {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Err(HostError::NoContent(node.id.clone())),
        }
    }

    fn create_node_id(&self, seed: &str) -> String {
        node::node_id(seed)
    }

    fn create_content_digest(&self, record: &DocumentRecord) -> Result<String, HostError> {
        Ok(node::content_digest(record)?)
    }

    fn create_node(&self, record: DocumentRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    fn create_parent_child_link(&self, parent: &SourceNode, child: &DocumentRecord) {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ParentLink {
                parent: parent.id.clone(),
                child: child.id.clone(),
            });
    }

    fn panic_on_build(&self, message: &str) {
        self.fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
