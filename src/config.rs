//! Site configuration module.
//!
//! Handles loading, validating, and generating `asciidoc-pages.toml`. The
//! file lives in the content root and is layered on top of stock defaults:
//! a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! path_prefix = ""          # Sub-path the site is served from, e.g. "/docs"
//!
//! [plugin]
//! file_extensions = ["adoc", "asciidoc"]
//! defines_empty_attributes = true
//! converter = "html5"       # or { command = ["asciidoctor", "--embedded", "-o", "-", "-"] }
//!
//! [plugin.attributes]
//! imagesdir = "/images@"    # Prefixed with path_prefix
//! skip-front-matter = true
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::options::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the content root.
pub const CONFIG_FILENAME: &str = "asciidoc-pages.toml";

/// Extensions handled when `file_extensions` is not configured.
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["adoc", "asciidoc"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `asciidoc-pages.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Base path prepended to site-relative URLs (e.g. `/docs`).
    pub path_prefix: String,
    /// Options that control how documents become nodes.
    pub plugin: PluginOptions,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path_prefix.is_empty() && !self.path_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "path_prefix must be empty or start with '/'".into(),
            ));
        }
        if let Some(exts) = &self.plugin.file_extensions {
            if exts.is_empty() {
                return Err(ConfigError::Validation(
                    "plugin.file_extensions must not be empty".into(),
                ));
            }
            if let Some(bad) = exts.iter().find(|e| e.is_empty() || e.starts_with('.')) {
                return Err(ConfigError::Validation(format!(
                    "plugin.file_extensions entry {bad:?} must be a bare extension like \"adoc\""
                )));
            }
        }
        if let ConverterConfig::Command(argv) = &self.plugin.converter
            && argv.is_empty()
        {
            return Err(ConfigError::Validation(
                "plugin.converter.command must name a program".into(),
            ));
        }
        Ok(())
    }
}

/// Options that shape the document transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginOptions {
    /// Extensions (without the dot) treated as Asciidoc.
    /// When absent, [`DEFAULT_FILE_EXTENSIONS`] applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,
    /// Store empty `page-*` attributes as an explicit empty marker instead of null.
    pub defines_empty_attributes: bool,
    /// How document bodies are converted to HTML.
    pub converter: ConverterConfig,
    /// Attributes forwarded to the engine after normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            file_extensions: None,
            defines_empty_attributes: true,
            converter: ConverterConfig::default(),
            attributes: None,
        }
    }
}

impl PluginOptions {
    /// The configured extensions, or the built-in defaults.
    pub fn supported_extensions(&self) -> Vec<&str> {
        match &self.file_extensions {
            Some(exts) => exts.iter().map(String::as_str).collect(),
            None => DEFAULT_FILE_EXTENSIONS.to_vec(),
        }
    }

    /// Whether a file with this extension should be transformed.
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.supported_extensions().contains(&extension)
    }
}

/// Body converter selection.
///
/// ```toml
/// converter = "html5"
/// converter = { command = ["asciidoctor", "--embedded", "-o", "-", "-"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterConfig {
    /// In-process HTML rendering with `acdc-converters-html`.
    #[default]
    Html5,
    /// External program reading Asciidoc on stdin and writing HTML to stdout.
    Command(Vec<String>),
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel document workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `asciidoc-pages.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` when the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the content root, falling back to stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# asciidoc-pages configuration
# ============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Sub-path the site is served from. Prepended to imagesdir.
# path_prefix = "/docs"
path_prefix = ""

# ---------------------------------------------------------------------------
# Document transform
# ---------------------------------------------------------------------------
[plugin]
# File extensions treated as Asciidoc. Files with other extensions are
# ignored without error.
# file_extensions = ["adoc", "asciidoc"]

# When true, `:page-foo:` with no value becomes an explicit empty marker and
# "foo" is listed in the manifest's empty attribute names. When false, the
# empty value decodes to null.
defines_empty_attributes = true

# Body converter. "html5" renders in-process. To use Asciidoctor for the body:
# converter = { command = ["asciidoctor", "--embedded", "-o", "-", "-"] }
converter = "html5"

# ---------------------------------------------------------------------------
# Attributes passed to every document
# ---------------------------------------------------------------------------
# A value ending in "@" is a default the document may override.
# [plugin.attributes]
# imagesdir = "/images@"
# skip-front-matter = true
# icons = "font"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel document workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_no_prefix() {
        let config = SiteConfig::default();
        assert_eq!(config.path_prefix, "");
        assert!(config.plugin.defines_empty_attributes);
        assert_eq!(config.plugin.converter, ConverterConfig::Html5);
    }

    #[test]
    fn default_supported_extensions() {
        let plugin = PluginOptions::default();
        assert_eq!(plugin.supported_extensions(), vec!["adoc", "asciidoc"]);
        assert!(plugin.supports_extension("adoc"));
        assert!(!plugin.supports_extension("md"));
    }

    #[test]
    fn configured_extensions_replace_defaults() {
        let plugin = PluginOptions {
            file_extensions: Some(vec!["ad".to_string()]),
            ..PluginOptions::default()
        };
        assert!(plugin.supports_extension("ad"));
        assert!(!plugin.supports_extension("adoc"));
    }

    #[test]
    fn parse_plugin_section() {
        let toml = r##"
path_prefix = "/docs"

[plugin]
file_extensions = ["txt"]
defines_empty_attributes = false

[plugin.attributes]
imagesdir = "/pics"
skip-front-matter = false
toclevels = 3
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.path_prefix, "/docs");
        assert_eq!(config.plugin.file_extensions, Some(vec!["txt".to_string()]));
        assert!(!config.plugin.defines_empty_attributes);
        let attrs = config.plugin.attributes.unwrap();
        assert_eq!(attrs["imagesdir"], AttributeValue::Text("/pics".to_string()));
        assert_eq!(attrs["skip-front-matter"], AttributeValue::Flag(false));
        assert_eq!(attrs["toclevels"], AttributeValue::Integer(3));
    }

    #[test]
    fn parse_command_converter() {
        let toml = r##"
[plugin]
converter = { command = ["asciidoctor", "-e"] }
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.plugin.converter,
            ConverterConfig::Command(vec!["asciidoctor".to_string(), "-e".to_string()])
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[plugin]\nfile_extension = [\"adoc\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_rejects_relative_prefix() {
        let config = SiteConfig {
            path_prefix: "docs".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = SiteConfig::default();
        config.plugin.file_extensions = Some(vec![".adoc".to_string()]);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_command() {
        let mut config = SiteConfig::default();
        config.plugin.converter = ConverterConfig::Command(vec![]);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_merges_over_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "path_prefix = \"/blog\"\n[processing]\nmax_processes = 2\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.path_prefix, "/blog");
        assert_eq!(config.processing.max_processes, Some(2));
        // Unspecified values stay default
        assert!(config.plugin.defines_empty_attributes);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_runs_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "path_prefix = \"nope\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn merge_toml_overlay_wins() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(usize::MAX),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
