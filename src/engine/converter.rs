//! Body converter trait and shared types.
//!
//! A [`Converter`] turns an already-parsed document into HTML.
//! The engine picks one strategy when it is built (from
//! [`ConverterConfig`](crate::config::ConverterConfig)) and uses it for every
//! document in the session, so there is no per-document registration step.
//!
//! Implementations:
//! - [`HtmlConverter`](super::html::HtmlConverter): renders the parsed tree
//!   in-process with `acdc-converters-html`
//! - [`CommandConverter`](super::command::CommandConverter): pipes the
//!   document through an external program such as `asciidoctor`

use crate::options::ConversionOptions;
use acdc_parser::Document;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("converter command is empty")]
    NoProgram,
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("HTML rendering failed: {0}")]
    Render(String),
    #[error("converter output is not UTF-8")]
    InvalidOutput,
}

/// Everything a converter may look at for one document.
#[derive(Debug, Clone, Copy)]
pub struct ConvertInput<'a> {
    /// The raw document, header and front matter included.
    pub source: &'a str,
    /// The parse every record fact was read from.
    pub document: &'a Document,
    /// The normalized options the document was loaded with.
    pub options: &'a ConversionOptions,
}

/// Strategy for rendering a document body to HTML.
///
/// `Send + Sync` so one converter can serve every worker of a parallel build.
pub trait Converter: Send + Sync {
    /// Short name used in CLI output.
    fn name(&self) -> &str;

    /// Render the body. Called exactly once per document.
    fn convert(&self, input: &ConvertInput<'_>) -> Result<String, ConvertError>;
}
