//! Document transform: one source node in, at most one record out.
//!
//! [`on_create_node`] runs for every source node the host knows about:
//!
//! ```text
//! extension supported? ──no──▶ Skipped
//!        │ yes
//!        ▼
//! normalized options (memoized) ─▶ load content ─▶ engine.load (once)
//!        ─▶ page-* attributes ─▶ front matter ─▶ assemble record
//!        ─▶ content digest (last) ─▶ create node + parent link ─▶ Created
//! ```
//!
//! Any failure after the extension check is reported once through
//! [`Host::panic_on_build`], naming the file (or the node id for nodes not
//! backed by a file), and the node yields [`NodeOutcome::Failed`]. Other
//! documents are unaffected.
//!
//! Page attributes and front matter are read from the same content along
//! separate paths and stored side by side; neither overrides the other.

use crate::config::{PluginOptions, SiteConfig};
use crate::engine::{AsciidocEngine, Engine, EngineError};
use crate::frontmatter::{self, FrontMatterError};
use crate::host::{Host, HostError};
use crate::node::{DocumentInfo, DocumentRecord, ID_SEED_SUFFIX, Internal, MEDIA_TYPE, NODE_TYPE, SourceNode};
use crate::options::OptionsCache;
use crate::pages::{self, EmptyAttributeNames, PageAttributeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    PageAttribute(#[from] PageAttributeError),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

/// What happened to one source node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// Extension not handled; nothing created, nothing reported.
    Skipped,
    /// A record with this id was created.
    Created(String),
    /// A fatal report was raised for this node.
    Failed,
}

/// State shared by every document of one build.
///
/// Owns the options memo table and the empty page attribute names, so both
/// live exactly as long as the build and start empty for the next one.
pub struct Session {
    pub plugin: PluginOptions,
    pub path_prefix: String,
    pub options_cache: OptionsCache,
    pub empty_attributes: EmptyAttributeNames,
    engine: Box<dyn Engine>,
}

impl Session {
    /// Session with the engine selected by the config's converter setting.
    pub fn new(config: &SiteConfig) -> Self {
        Self::with_engine(
            config.plugin.clone(),
            &config.path_prefix,
            Box::new(AsciidocEngine::from_config(&config.plugin.converter)),
        )
    }

    pub fn with_engine(plugin: PluginOptions, path_prefix: &str, engine: Box<dyn Engine>) -> Self {
        Self {
            plugin,
            path_prefix: path_prefix.to_string(),
            options_cache: OptionsCache::new(),
            empty_attributes: EmptyAttributeNames::new(),
            engine,
        }
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }
}

/// Transform one source node, registering its record with the host.
pub fn on_create_node(node: &SourceNode, host: &dyn Host, session: &Session) -> NodeOutcome {
    if !session.plugin.supports_extension(&node.extension) {
        return NodeOutcome::Skipped;
    }

    match build_record(node, host, session) {
        Ok(record) => {
            let id = record.id.clone();
            host.create_parent_child_link(node, &record);
            host.create_node(record);
            NodeOutcome::Created(id)
        }
        Err(err) => {
            host.panic_on_build(&fatal_message(node, &err));
            NodeOutcome::Failed
        }
    }
}

fn build_record(
    node: &SourceNode,
    host: &dyn Host,
    session: &Session,
) -> Result<DocumentRecord, TransformError> {
    let options = session
        .options_cache
        .get_or_normalize(&session.plugin, &session.path_prefix);

    let content = host.load_node_content(node)?;
    let doc = session.engine().load(&content, &options)?;

    let page_attributes = pages::extract_page_attributes(
        &doc.attributes,
        session.plugin.defines_empty_attributes,
        &session.empty_attributes,
    )?;
    let front_matter = frontmatter::parse(&content)?;

    let title = doc.title.as_ref();
    let mut record = DocumentRecord {
        id: host.create_node_id(&format!("{}{ID_SEED_SUFFIX}", node.id)),
        parent: node.id.clone(),
        children: Vec::new(),
        internal: Internal {
            node_type: NODE_TYPE.to_string(),
            media_type: MEDIA_TYPE.to_string(),
            content: front_matter.content,
            content_digest: None,
        },
        document: DocumentInfo {
            title: title.map(|t| t.combined.clone()),
            subtitle: title.and_then(|t| t.subtitle.clone()),
            main: title.map(|t| t.main.clone()),
            description: doc.attribute("description").map(str::to_string),
        },
        html: doc.html,
        revision: doc.revision,
        author: doc.author,
        page_attributes,
        frontmatter: front_matter.data,
    };

    record.internal.content_digest = Some(host.create_content_digest(&record)?);
    Ok(record)
}

/// `Error processing Asciidoc file <path>:` (or `in node <id>:`), a blank
/// line, then the error.
pub fn fatal_message(node: &SourceNode, err: &TransformError) -> String {
    let subject = match &node.absolute_path {
        Some(path) => format!("file {}", path.display()),
        None => format!("in node {}", node.id),
    };
    format!("Error processing Asciidoc {subject}:\n\n{err}")
}
