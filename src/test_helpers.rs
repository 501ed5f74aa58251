//! Shared test utilities for the asciidoc-pages test suite.
//!
//! Provides a throwaway content tree, node and session builders, and lookup
//! helpers that panic with the available choices on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let nodes = scan(tmp.path(), None).unwrap();
//! let node = find_node(&nodes, "guides/install.asciidoc");
//! assert_eq!(node.extension, "asciidoc");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::PluginOptions;
use crate::node::{DocumentRecord, SourceNode};
use crate::transform::Session;

// =========================================================================
// Fixture setup
// =========================================================================

/// Files written by [`setup_content`].
pub const CONTENT_FILES: &[(&str, &str)] = &[
    (
        "index.adoc",
        "= Welcome: A Small Site\nAnn Smith <ann@example.org>\nv1.0, 2024-03-01: Launch\n:description: Landing page\n:page-order: 1\n:page-tags: [home, intro]\n\nHello from the *index*.\n\n== Next Steps\n\nRead the guides.\n",
    ),
    (
        "guides/install.asciidoc",
        "---\nlayout: guide\n---\n= Installing\n:page-draft:\n\n== Requirements\n\n* A computer\n* Patience\n",
    ),
    ("guides/diagram.png", "not really a png"),
    ("notes.md", "# Not Asciidoc\n"),
];

/// Write a small content tree to a temp directory and return it.
///
/// Tests get an isolated copy they can add files to.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, content) in CONTENT_FILES {
        write_file(tmp.path(), path, content);
    }
    tmp
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// =========================================================================
// Builders
// =========================================================================

/// A source node with no backing file. Pair with `NodeStore::with_content`.
pub fn source_node(id: &str, extension: &str) -> SourceNode {
    SourceNode {
        id: id.to_string(),
        extension: extension.to_string(),
        absolute_path: None,
        relative_path: format!("{id}.{extension}"),
    }
}

/// A session using the built-in HTML converter and no path prefix.
pub fn session(plugin: PluginOptions) -> Session {
    Session::new(&crate::config::SiteConfig {
        plugin,
        ..Default::default()
    })
}

// =========================================================================
// Lookups, panics with a clear message on miss
// =========================================================================

/// Find a scanned node by relative path. Panics if not found.
pub fn find_node<'a>(nodes: &'a [SourceNode], relative_path: &str) -> &'a SourceNode {
    nodes
        .iter()
        .find(|n| n.relative_path == relative_path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = nodes.iter().map(|n| n.relative_path.as_str()).collect();
            panic!("node '{relative_path}' not found. Available: {paths:?}")
        })
}

/// Find the record created for a source node. Panics if not found.
pub fn find_record<'a>(records: &'a [DocumentRecord], parent_id: &str) -> &'a DocumentRecord {
    records
        .iter()
        .find(|r| r.parent == parent_id)
        .unwrap_or_else(|| {
            let parents: Vec<&str> = records.iter().map(|r| r.parent.as_str()).collect();
            panic!("no record with parent '{parent_id}'. Available: {parents:?}")
        })
}
