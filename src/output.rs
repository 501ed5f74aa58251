//! CLI output formatting for the build stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each document is
//! shown by its positional index and title, with the file it came from as an
//! indented `Source:` line. Metadata the transform extracted (author,
//! revision, page attributes) follows as further context lines, so the
//! output reads as an inventory of what downstream queries will see.
//!
//! # Output Format
//!
//! ## Config
//!
//! ```text
//! Config
//!     Source: asciidoc-pages.toml
//!     Extensions: adoc, asciidoc
//!     Converter: html5
//!     Path prefix: /docs
//! ```
//!
//! ## Build
//!
//! ```text
//! Documents
//! 001 Welcome: A Small Site
//!     Source: index.adoc
//!     Author: Ann Smith
//!     Revision: 1.0 (2024-03-01)
//!     Landing page
//!     page-order: 1
//!     page-tags: ["home","intro"]
//! 002 (untitled.adoc)
//!     page-draft: (empty)
//!
//! Skipped
//!     guides/diagram.png
//!
//! Transformed 2 documents, skipped 1 file (html5, 4 threads)
//! ```
//!
//! Untitled documents show their file name in parentheses instead of a
//! title; the file name is then their identity, so no `Source:` line.
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! with no I/O.

use crate::config::{CONFIG_FILENAME, ConverterConfig, SiteConfig};
use crate::node::DocumentRecord;
use crate::pages::PageValue;
use crate::pipeline::BuildReport;
use crate::transform::NodeOutcome;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a document line: titled documents show the title, untitled ones
/// the file name in parens.
///
/// ```text
/// 001 Installing        // titled
/// 001 (notes.adoc)      // untitled
/// ```
fn document_line(index: usize, title: Option<&str>, filename: &str) -> String {
    match title.map(strip_html_tags) {
        Some(t) if !t.trim().is_empty() => format!("{} {}", format_index(index), t.trim()),
        _ => format!("{} ({})", format_index(index), filename),
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `1 document` / `2 documents`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn converter_label(converter: &ConverterConfig) -> String {
    match converter {
        ConverterConfig::Html5 => "html5".to_string(),
        ConverterConfig::Command(argv) => argv.join(" "),
    }
}

/// Context lines for one record, at depth 1.
fn record_details(record: &DocumentRecord) -> Vec<String> {
    let pad = indent(1);
    let mut lines = Vec::new();

    if let Some(name) = record.author.as_ref().and_then(|a| a.full_name.as_deref()) {
        lines.push(format!("{pad}Author: {name}"));
    }
    if let Some(rev) = &record.revision {
        let line = match (rev.number.as_deref(), rev.date.as_deref()) {
            (Some(n), Some(d)) => format!("{n} ({d})"),
            (Some(n), None) => n.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => rev.remark.clone().unwrap_or_default(),
        };
        lines.push(format!("{pad}Revision: {line}"));
    }
    if let Some(desc) = &record.document.description {
        let truncated = truncate_desc(strip_html_tags(desc).trim(), 60);
        if !truncated.is_empty() {
            lines.push(format!("{pad}{truncated}"));
        }
    }
    for (name, value) in &record.page_attributes {
        let shown = match value {
            PageValue::Empty => "(empty)".to_string(),
            PageValue::Value(v) => v.to_string(),
        };
        lines.push(format!("{pad}page-{name}: {shown}"));
    }
    lines
}

// ============================================================================
// Config output
// ============================================================================

/// Format the effective configuration a build runs with.
///
/// `has_file` says whether a config file was found; without one the stock
/// defaults apply and the `Source:` line says so.
pub fn format_config_output(config: &SiteConfig, has_file: bool) -> Vec<String> {
    let pad = indent(1);
    let mut lines = vec!["Config".to_string()];
    if has_file {
        lines.push(format!("{pad}Source: {CONFIG_FILENAME}"));
    } else {
        lines.push(format!("{pad}Source: (stock defaults)"));
    }
    lines.push(format!(
        "{pad}Extensions: {}",
        config.plugin.supported_extensions().join(", ")
    ));
    lines.push(format!(
        "{pad}Converter: {}",
        converter_label(&config.plugin.converter)
    ));
    if !config.path_prefix.is_empty() {
        lines.push(format!("{pad}Path prefix: {}", config.path_prefix));
    }
    lines
}

/// Print config output to stdout.
pub fn print_config_output(config: &SiteConfig, has_file: bool) {
    for line in format_config_output(config, has_file) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the result of a build: documents, skipped files, and a summary.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Documents".to_string()];
    let mut skipped = Vec::new();
    let mut index = 0;

    for (node, outcome) in &report.outcomes {
        match outcome {
            NodeOutcome::Skipped => skipped.push(node.relative_path.as_str()),
            NodeOutcome::Failed => {}
            NodeOutcome::Created(_) => {
                let Some(record) = report.record_for(node) else {
                    continue;
                };
                index += 1;
                let filename = node
                    .relative_path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&node.relative_path);
                let title = record.document.title.as_deref();
                let titled = title.is_some_and(|t| !strip_html_tags(t).trim().is_empty());
                lines.push(document_line(index, title, filename));
                if titled || node.relative_path != filename {
                    lines.push(format!("{}Source: {}", indent(1), node.relative_path));
                }
                lines.extend(record_details(record));
            }
        }
    }

    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for path in &skipped {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Transformed {}, skipped {} ({}, {})",
        plural(report.created(), "document"),
        plural(report.skipped(), "file"),
        report.converter,
        plural(report.threads, "thread"),
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

/// Format the fatal reports of a failed build, one block per document.
pub fn format_fatal_errors(reports: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} failed", plural(reports.len(), "document"))];
    for report in reports {
        lines.push(String::new());
        lines.extend(report.lines().map(str::to_string));
    }
    lines
}

/// Print fatal reports to stderr.
pub fn print_fatal_errors(reports: &[String]) {
    for line in format_fatal_errors(reports) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline;
    use crate::test_helpers::{setup_content, write_file};

    fn build_lines(root: &std::path::Path) -> Vec<String> {
        let report = pipeline::run(root, None, &SiteConfig::default()).unwrap();
        format_build_output(&report)
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn strip_html_tags_removes_tags() {
        assert_eq!(strip_html_tags("<strong>Bold</strong> text"), "Bold text");
    }

    #[test]
    fn strip_html_tags_no_tags() {
        assert_eq!(strip_html_tags("plain"), "plain");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("short", 60), "short");
    }

    #[test]
    fn truncate_desc_long() {
        assert_eq!(truncate_desc("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn truncate_desc_counts_chars_not_bytes() {
        assert_eq!(truncate_desc("ééééé", 2), "éé...");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn document_line_with_title() {
        assert_eq!(document_line(1, Some("Installing"), "install.adoc"), "001 Installing");
    }

    #[test]
    fn document_line_strips_inline_markup() {
        assert_eq!(
            document_line(2, Some("The <em>Fast</em> Path"), "fast.adoc"),
            "002 The Fast Path"
        );
    }

    #[test]
    fn document_line_without_title() {
        assert_eq!(document_line(3, None, "notes.adoc"), "003 (notes.adoc)");
        assert_eq!(document_line(3, Some(""), "notes.adoc"), "003 (notes.adoc)");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(0, "file"), "0 files");
        assert_eq!(plural(3, "thread"), "3 threads");
    }

    // =========================================================================
    // Config output tests
    // =========================================================================

    #[test]
    fn config_output_defaults() {
        let lines = format_config_output(&SiteConfig::default(), false);
        assert_eq!(
            lines,
            vec![
                "Config",
                "    Source: (stock defaults)",
                "    Extensions: adoc, asciidoc",
                "    Converter: html5",
            ]
        );
    }

    #[test]
    fn config_output_command_and_prefix() {
        let mut config = SiteConfig::default();
        config.path_prefix = "/docs".into();
        config.plugin.converter =
            ConverterConfig::Command(vec!["asciidoctor".into(), "-e".into(), "-".into()]);
        let lines = format_config_output(&config, true);
        assert_eq!(lines[1], "    Source: asciidoc-pages.toml");
        assert_eq!(lines[3], "    Converter: asciidoctor -e -");
        assert_eq!(lines[4], "    Path prefix: /docs");
    }

    // =========================================================================
    // Build output tests
    // =========================================================================

    #[test]
    fn build_output_lists_documents_with_context() {
        let tmp = setup_content();
        let lines = build_lines(tmp.path());
        assert_eq!(lines[0], "Documents");
        assert_eq!(lines[1], "001 Installing");
        assert_eq!(lines[2], "    Source: guides/install.asciidoc");
        assert_eq!(lines[3], "    page-draft: (empty)");
        assert_eq!(lines[4], "002 Welcome: A Small Site");
        assert_eq!(lines[5], "    Source: index.adoc");
        assert_eq!(lines[6], "    Author: Ann Smith");
        assert_eq!(lines[7], "    Revision: 1.0 (2024-03-01)");
        assert_eq!(lines[8], "    Landing page");
        assert_eq!(lines[9], "    page-order: 1");
        assert_eq!(lines[10], r#"    page-tags: ["home","intro"]"#);
    }

    #[test]
    fn build_output_lists_skipped_and_summary() {
        let tmp = setup_content();
        let lines = build_lines(tmp.path());
        let skipped = lines.iter().position(|l| l == "Skipped").unwrap();
        assert_eq!(lines[skipped + 1], "    guides/diagram.png");
        assert_eq!(lines[skipped + 2], "    notes.md");
        let summary = lines.last().unwrap();
        assert!(summary.starts_with("Transformed 2 documents, skipped 2 files (html5, "));
    }

    #[test]
    fn untitled_top_level_document_has_no_source_line() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_file(tmp.path(), "plain.adoc", "Just a paragraph.\n");
        let lines = build_lines(tmp.path());
        assert_eq!(lines[1], "001 (plain.adoc)");
        assert_eq!(lines[2], "");
        assert!(!lines.iter().any(|l| l.contains("Skipped")));
    }

    #[test]
    fn fatal_errors_keep_report_lines() {
        let reports = vec![
            "Error processing Asciidoc file /a.adoc:\n\nbad value".to_string(),
            "Error processing Asciidoc file /b.adoc:\n\nworse".to_string(),
        ];
        let lines = format_fatal_errors(&reports);
        assert_eq!(lines[0], "2 documents failed");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Error processing Asciidoc file /a.adoc:");
        assert_eq!(lines[4], "bad value");
        assert_eq!(lines[6], "Error processing Asciidoc file /b.adoc:");
    }
}
