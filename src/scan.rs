//! Content directory scanning.
//!
//! Stage 1 of a build. Walks the content root and turns every file into a
//! [`SourceNode`], the way a host build registers files before any plugin
//! sees them. Extension filtering is left to the transform, so unsupported
//! files show up here and are skipped later.
//!
//! ```text
//! content/                       # Content root
//! ├── asciidoc-pages.toml        # Config (not a node)
//! ├── index.adoc                 # → node, transformed
//! ├── guides/
//! │   ├── install.adoc           # → node, transformed
//! │   └── diagram.png            # → node, skipped by the transform
//! └── .drafts/                   # Hidden: not scanned
//! ```
//!
//! Nodes come back sorted by relative path so ids and output order are
//! stable between runs.

use crate::config::CONFIG_FILENAME;
use crate::node::{self, SourceNode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Scan `root` into source nodes. `exclude` (e.g. the output directory) is skipped.
pub fn scan(root: &Path, exclude: Option<&Path>) -> Result<Vec<SourceNode>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize()?;
    let exclude = exclude.and_then(|p| p.canonicalize().ok());

    let mut nodes = Vec::new();
    let walker = WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || (!is_hidden(e) && exclude.as_deref().is_none_or(|ex| e.path() != ex))
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if entry.depth() == 1 && entry.file_name() == CONFIG_FILENAME {
            continue;
        }
        nodes.push(source_node(&root, path));
    }

    nodes.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(nodes)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn source_node(root: &Path, path: &Path) -> SourceNode {
    let relative_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    SourceNode {
        id: node::node_id(&format!("file {relative_path}")),
        extension,
        absolute_path: Some(path.to_path_buf()),
        relative_path,
    }
}
