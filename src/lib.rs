//! # Asciidoc Pages
//!
//! Turns Asciidoc documents into page nodes for a static site build. Each
//! document is converted to HTML and described by a record carrying its
//! title parts, revision, author, front matter, and custom page attributes,
//! ready to be queried by whatever renders the site.
//!
//! # Architecture: Host and Transform
//!
//! The transform never touches the build's node store directly. It talks to
//! a [`host::Host`], which loads file content, mints ids and digests, and
//! accepts created nodes and fatal reports. The CLI uses the in-memory
//! [`host::NodeStore`]; tests use the same store with canned content.
//!
//! ```text
//! 1. Scan       content/       →  source nodes     (one per file)
//! 2. Transform  source nodes   →  records + links  (Asciidoc files only, in parallel)
//! 3. Write      records        →  dist/nodes.json
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directory into source nodes |
//! | [`transform`] | Stage 2: per-node transform and the build session it shares |
//! | [`pipeline`] | Runs the stages, gathers fatal reports, writes the manifest |
//! | [`engine`] | Asciidoc loading: one parse, document facts, body conversion |
//! | [`options`] | Normalized conversion options and their per-build memo table |
//! | [`pages`] | `page-*` attribute extraction and YAML value decoding |
//! | [`frontmatter`] | YAML front matter splitting and parsing |
//! | [`node`] | Record types, node ids, and content digests |
//! | [`host`] | The host seam and the in-memory node store |
//! | [`scroll`] | Anchor scroll restoration hooks and their browser script |
//! | [`config`] | `asciidoc-pages.toml` loading, validation, and stock defaults |
//! | [`output`] | CLI output formatting, an inventory of built documents |
//!
//! # Design Decisions
//!
//! ## One Parse, Pluggable Body Rendering
//!
//! Each document is parsed once with `acdc-parser`. Title, attributes,
//! author and revision are read from that parse, and the body is rendered
//! from it by `acdc-converters-html`. Sites that want Asciidoctor's exact
//! markup can point `plugin.converter` at an external program instead; it
//! only replaces the body, so metadata is the same with either converter.
//!
//! ## Page Attributes as YAML
//!
//! `:page-tags: [a, b]` becomes a list and `:page-order: 3` a number.
//! Decoding is YAML so authors can write structured values without quoting
//! JSON. A value that fails to decode fails the whole build, listing every
//! broken document at once.
//!
//! ## Empty Attributes Are Tracked
//!
//! An attribute declared with no value is kept as an explicit empty marker
//! rather than null, and its name is recorded across the build. Schema
//! inference downstream can then type the field even when every document
//! leaves it empty.

pub mod config;
pub mod engine;
pub mod frontmatter;
pub mod host;
pub mod node;
pub mod options;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod scan;
pub mod scroll;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
