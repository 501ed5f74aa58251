//! Build pipeline.
//!
//! ```text
//! 1. Scan       content/        →  source nodes
//! 2. Transform  source nodes    →  records + links   (parallel, one session)
//! 3. Write      records + links →  dist/nodes.json
//! ```
//!
//! All documents run even when some fail. Fatal reports are collected by
//! the host and turned into a single [`BuildError::Fatal`] at the end, so a
//! build lists every broken document at once instead of stopping at the
//! first.
//!
//! The manifest also carries the empty page attribute names gathered over
//! the whole build, for downstream schema inference.

use crate::config::{self, SiteConfig};
use crate::host::NodeStore;
use crate::node::{DocumentRecord, ParentLink, SourceNode};
use crate::scan::{self, ScanError};
use crate::transform::{NodeOutcome, Session, on_create_node};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest written to the output directory.
pub const MANIFEST_FILENAME: &str = "nodes.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("{} document(s) failed to build:\n\n{}", .0.len(), .0.join("\n\n"))]
    Fatal(Vec<String>),
}

/// Everything a build produces, as written to `nodes.json`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesManifest {
    pub nodes: Vec<DocumentRecord>,
    pub links: Vec<ParentLink>,
    pub empty_attribute_names: Vec<String>,
}

/// Result of running every scanned node through the transform.
#[derive(Debug)]
pub struct BuildReport {
    /// Scanned nodes paired with what happened to each, in scan order.
    pub outcomes: Vec<(SourceNode, NodeOutcome)>,
    pub manifest: NodesManifest,
    /// Body converter used for the build.
    pub converter: String,
    pub threads: usize,
}

impl BuildReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, NodeOutcome::Created(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, NodeOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&NodeOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    /// The record created for a source node, if any.
    pub fn record_for(&self, node: &SourceNode) -> Option<&DocumentRecord> {
        self.manifest.nodes.iter().find(|r| r.parent == node.id)
    }
}

/// Scan `source` and transform every node. Nothing is written.
///
/// `exclude` keeps the output directory out of the scan when it lives
/// inside the content root.
pub fn run(
    source: &Path,
    exclude: Option<&Path>,
    config: &SiteConfig,
) -> Result<BuildReport, BuildError> {
    let nodes = scan::scan(source, exclude)?;
    let session = Session::new(config);
    let threads = config::effective_threads(&config.processing);
    transform_nodes(nodes, &session, threads)
}

/// Transform `nodes` on a pool of `threads` workers sharing one session.
pub fn transform_nodes(
    nodes: Vec<SourceNode>,
    session: &Session,
    threads: usize,
) -> Result<BuildReport, BuildError> {
    let store = NodeStore::new();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let outcomes: Vec<NodeOutcome> = pool.install(|| {
        nodes
            .par_iter()
            .map(|node| on_create_node(node, &store, session))
            .collect()
    });

    let (mut records, mut links, fatal) = store.into_parts();
    if !fatal.is_empty() {
        return Err(BuildError::Fatal(fatal));
    }

    // Workers finish in any order; report in scan order.
    let position: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let order = |parent: &str| position.get(parent).copied().unwrap_or(usize::MAX);
    records.sort_by_key(|r| order(&r.parent));
    links.sort_by_key(|l| order(&l.parent));

    let manifest = NodesManifest {
        nodes: records,
        links,
        empty_attribute_names: session.empty_attributes.names(),
    };

    Ok(BuildReport {
        outcomes: nodes.into_iter().zip(outcomes).collect(),
        manifest,
        converter: session.engine().converter_name().to_string(),
        threads,
    })
}

/// Write the manifest to `output/nodes.json` and return its path.
pub fn write_manifest(manifest: &NodesManifest, output: &Path) -> Result<PathBuf, BuildError> {
    fs::create_dir_all(output)?;
    let path = output.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json)?;
    Ok(path)
}
