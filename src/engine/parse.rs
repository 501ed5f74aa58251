//! Parsing with `acdc-parser`, and the document facts read off the tree.
//!
//! A document is parsed exactly once. Everything the record needs (title,
//! author, revision, the final attribute table) is taken from that one
//! [`Document`], and the same tree is handed to the body converter.
//!
//! Option attributes are passed to the parser as initial document
//! attributes. Names set without a trailing `@` stay **locked**: whatever a
//! document writes for them, the table reports the option value, the way
//! Asciidoctor treats API attributes. A `false` option leaves the name
//! unset and the document free to set it.

use super::{AuthorInfo, DocumentTitle, RevisionInfo};
use crate::frontmatter;
use crate::options::{AttributeValue, ConversionOptions};
use acdc_parser::{
    AttributeValue as ParsedValue, Block, Document, DocumentAttributes, InlineNode, Options,
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct ParseError(String);

/// Parser options carrying the normalized option attributes.
pub fn parser_options(options: &ConversionOptions) -> Options {
    let mut attributes = DocumentAttributes::default();
    for (name, value) in &options.attributes {
        let value = match value {
            AttributeValue::Flag(false) => continue,
            AttributeValue::Flag(true) => ParsedValue::Bool(true),
            AttributeValue::Integer(n) => ParsedValue::String(n.to_string()),
            AttributeValue::Text(text) => {
                ParsedValue::String(text.strip_suffix('@').unwrap_or(text).to_string())
            }
        };
        attributes.insert(name.to_lowercase(), value);
    }

    let mut parser_options = Options::default();
    parser_options.document_attributes = attributes;
    parser_options
}

/// Parse `content`, dropping a leading front-matter block when the options
/// ask for it.
pub fn parse(content: &str, options: &ConversionOptions) -> Result<Document, ParseError> {
    let source = if options.skips_front_matter() {
        frontmatter::split(content).map_or(content, |(_, body)| body)
    } else {
        content
    };
    acdc_parser::parse(source, &parser_options(options)).map_err(|err| ParseError(err.to_string()))
}

fn attribute_text(value: &ParsedValue) -> Option<String> {
    match value {
        ParsedValue::String(text) => Some(text.clone()),
        ParsedValue::Bool(true) => Some(String::new()),
        _ => None,
    }
}

/// The document's final attributes as text. Set-but-empty names map to `""`.
pub fn attribute_table(document: &Document, options: &ConversionOptions) -> BTreeMap<String, String> {
    let mut table: BTreeMap<String, String> = document
        .attributes
        .iter()
        .filter_map(|(name, value)| attribute_text(value).map(|text| (name.to_lowercase(), text)))
        .collect();

    for (name, value) in &options.attributes {
        let name = name.to_lowercase();
        match value {
            AttributeValue::Flag(false) => {}
            AttributeValue::Text(text) if text.ends_with('@') => {}
            AttributeValue::Flag(true) => {
                table.insert(name, String::new());
            }
            locked => {
                table.insert(name, locked.to_string());
            }
        }
    }
    table
}

// =========================================================================
// Title
// =========================================================================

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn push_inline(node: &InlineNode, out: &mut String) {
    let (tag, children) = match node {
        InlineNode::PlainText(plain) => {
            out.push_str(&escape_html(&plain.content));
            return;
        }
        InlineNode::BoldText(bold) => ("strong", &bold.content),
        InlineNode::ItalicText(italic) => ("em", &italic.content),
        InlineNode::MonospaceText(mono) => ("code", &mono.content),
        _ => return,
    };
    out.push_str(&format!("<{tag}>"));
    for child in children {
        push_inline(child, out);
    }
    out.push_str(&format!("</{tag}>"));
}

/// Title inlines as HTML: text escaped, strong/emphasis/monospace kept.
fn inline_html<'a>(nodes: impl IntoIterator<Item = &'a InlineNode>) -> String {
    let mut out = String::new();
    for node in nodes {
        push_inline(node, &mut out);
    }
    out.trim().to_string()
}

fn header_title(document: &Document, separator: &str) -> Option<String> {
    let header = document.header.as_ref()?;
    let mut title = inline_html(header.title.iter());
    if let Some(subtitle) = &header.subtitle {
        title = format!("{title}{separator} {}", inline_html(subtitle.iter()));
    }
    (!title.is_empty()).then_some(title)
}

fn first_section_title(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|block| match block {
        Block::Section(section) => Some(inline_html(section.title.iter())),
        _ => None,
    })
}

/// The `title` attribute, else the header title, else the first section title.
pub fn document_title(
    document: &Document,
    attributes: &BTreeMap<String, String>,
) -> Option<DocumentTitle> {
    let separator = attributes
        .get("title-separator")
        .map_or(":", String::as_str);
    let combined = attributes
        .get("title")
        .cloned()
        .or_else(|| header_title(document, separator))
        .or_else(|| first_section_title(&document.blocks))?;
    Some(DocumentTitle::partition(&combined, separator))
}

// =========================================================================
// Author and revision
// =========================================================================

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// The first header author, or the `author` attribute family when the
/// header names nobody. `None` when there is no author at all.
pub fn author_info(document: &Document, attributes: &BTreeMap<String, String>) -> Option<AuthorInfo> {
    let attribute = |name: &str| attributes.get(name).and_then(|v| non_empty(v));

    let Some(author) = document.header.as_ref().and_then(|h| h.authors.first()) else {
        let full_name = attribute("author")?;
        return Some(AuthorInfo {
            full_name: Some(full_name),
            first_name: attribute("firstname"),
            last_name: attribute("lastname"),
            middle_name: attribute("middlename"),
            author_initials: attribute("authorinitials"),
            email: attribute("email"),
        });
    };

    let full_name = [
        Some(author.first_name.as_str()),
        author.middle_name.as_deref(),
        Some(author.last_name.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Some(AuthorInfo {
        full_name: non_empty(&full_name),
        first_name: non_empty(&author.first_name),
        last_name: non_empty(&author.last_name),
        middle_name: author.middle_name.as_deref().and_then(non_empty),
        author_initials: non_empty(&author.initials),
        email: author.email.as_deref().and_then(non_empty),
    })
}

/// `v1.2` and `1.2` both read as `1.2`.
fn revision_number(raw: &str) -> String {
    match raw.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => raw.to_string(),
    }
}

/// Present when any of `revnumber`, `revdate`, `revremark` is set.
pub fn revision_info(attributes: &BTreeMap<String, String>) -> Option<RevisionInfo> {
    let owned = |name: &str| attributes.get(name).cloned();
    ["revnumber", "revdate", "revremark"]
        .iter()
        .any(|name| attributes.contains_key(*name))
        .then(|| RevisionInfo {
            date: owned("revdate"),
            number: attributes.get("revnumber").map(|n| revision_number(n)),
            remark: owned("revremark"),
        })
}
