//! Asciidoc loading engine.
//!
//! The transform only needs a handful of facts about a document: its HTML
//! body, title parts, attribute table, revision and author. [`Engine::load`]
//! parses the document once with `acdc-parser`, reads every fact off that
//! parse, and hands the same tree to the body converter. The result is an
//! immutable [`LoadedDocument`], so no caller ever holds a half-converted
//! document.
//!
//! ## Modules
//!
//! | Module | Role |
//! |---|---|
//! | [`parse`] | Parsing, option attributes, title/author/revision lookup |
//! | [`converter`] | Body conversion strategy trait |
//! | [`html`] | In-process HTML converter over the parsed tree |
//! | [`command`] | External-program body converter (e.g. `asciidoctor`) |

pub mod command;
pub mod converter;
pub mod html;
pub mod parse;

pub use command::CommandConverter;
pub use converter::{ConvertError, Converter};
pub use html::HtmlConverter;
pub use parse::ParseError;

use crate::config::ConverterConfig;
use crate::options::ConversionOptions;
use converter::ConvertInput;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),
}

/// Document title split at the last `"{title-separator} "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTitle {
    pub combined: String,
    pub main: String,
    pub subtitle: Option<String>,
}

impl DocumentTitle {
    /// `"Guide: Part 1: Setup"` with separator `:` → main `"Guide: Part 1"`, subtitle `"Setup"`.
    pub fn partition(combined: &str, separator: &str) -> Self {
        let split = (!separator.is_empty())
            .then(|| combined.rsplit_once(&format!("{separator} ")))
            .flatten();
        match split {
            Some((main, subtitle)) => Self {
                combined: combined.to_string(),
                main: main.to_string(),
                subtitle: Some(subtitle.to_string()),
            },
            None => Self {
                combined: combined.to_string(),
                main: combined.to_string(),
                subtitle: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionInfo {
    pub date: Option<String>,
    pub number: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub author_initials: Option<String>,
    pub email: Option<String>,
}

/// Everything the transform reads from one loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub html: String,
    /// `None` when the document has neither a title nor any section.
    pub title: Option<DocumentTitle>,
    /// Final attribute table from the parse, locked option values applied.
    pub attributes: BTreeMap<String, String>,
    /// Present when any of `revnumber`, `revdate`, `revremark` is set.
    pub revision: Option<RevisionInfo>,
    /// Present when the header or the `author` attribute names someone.
    pub author: Option<AuthorInfo>,
}

impl LoadedDocument {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Loads Asciidoc source into a [`LoadedDocument`].
///
/// Implementations must be usable from several worker threads at once.
pub trait Engine: Send + Sync {
    fn load(&self, content: &str, options: &ConversionOptions)
    -> Result<LoadedDocument, EngineError>;

    /// Name of the body converter, for CLI output.
    fn converter_name(&self) -> &str;
}

/// The engine used by builds: one `acdc-parser` parse plus a body converter.
pub struct AsciidocEngine {
    converter: Box<dyn Converter>,
}

impl AsciidocEngine {
    pub fn new(converter: Box<dyn Converter>) -> Self {
        Self { converter }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        match config {
            ConverterConfig::Html5 => Self::new(Box::new(HtmlConverter)),
            ConverterConfig::Command(argv) => Self::new(Box::new(CommandConverter::new(argv.clone()))),
        }
    }
}

impl Engine for AsciidocEngine {
    fn load(
        &self,
        content: &str,
        options: &ConversionOptions,
    ) -> Result<LoadedDocument, EngineError> {
        let document = parse::parse(content, options)?;

        let html = self.converter.convert(&ConvertInput {
            source: content,
            document: &document,
            options,
        })?;

        let attributes = parse::attribute_table(&document, options);
        Ok(LoadedDocument {
            html,
            title: parse::document_title(&document, &attributes),
            revision: parse::revision_info(&attributes),
            author: parse::author_info(&document, &attributes),
            attributes,
        })
    }

    fn converter_name(&self) -> &str {
        self.converter.name()
    }
}
