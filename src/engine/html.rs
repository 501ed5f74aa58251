//! Built-in body converter backed by `acdc-converters-html`.
//!
//! The HTML processor renders the already-parsed [`Document`](acdc_parser::Document)
//! as a standalone page. Records carry only what sits inside the page's
//! `<div id="content">`, the same fragment Asciidoctor's embedded output
//! produces.

use super::converter::{ConvertError, ConvertInput, Converter};
use acdc_converters_core::{Converter as _, Options};
use acdc_converters_html::Processor;

const CONTENT_OPEN: &str = r#"<div id="content">"#;
const FOOTER_OPEN: &str = r#"<div id="footer""#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlConverter;

impl Converter for HtmlConverter {
    fn name(&self) -> &str {
        "html5"
    }

    fn convert(&self, input: &ConvertInput<'_>) -> Result<String, ConvertError> {
        let processor = Processor::new(Options::default(), input.document.attributes.clone());
        let mut page = Vec::new();
        processor
            .write_to(input.document, &mut page, None)
            .map_err(|err| ConvertError::Render(err.to_string()))?;
        let page = String::from_utf8(page).map_err(|_| ConvertError::InvalidOutput)?;
        Ok(embedded_content(&page).to_string())
    }
}

/// The inside of `<div id="content">`, or the whole input trimmed when the
/// page has no content division.
pub fn embedded_content(page: &str) -> &str {
    let Some(start) = page.find(CONTENT_OPEN) else {
        return page.trim();
    };
    let inner = &page[start + CONTENT_OPEN.len()..];
    let end = inner
        .rfind(FOOTER_OPEN)
        .or_else(|| inner.rfind("</body>"))
        .unwrap_or(inner.len());
    let inner = inner[..end].trim_end();
    inner.strip_suffix("</div>").unwrap_or(inner).trim()
}
