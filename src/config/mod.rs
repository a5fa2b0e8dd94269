//! Configuration system for bundlequill.
//!
//! Configuration is read from `~/.config/bundlequill/config.toml` and merged
//! with command-line arguments, which take precedence. Every field has a
//! default, so a partial (or missing) file is fine.
//!
//! # Example
//!
//! ```
//! use bundlequill::config::Config;
//! use bundlequill::bundle::LabelMatch;
//!
//! let config: Config = toml::from_str(r#"
//! label_match = "exact"
//!
//! [required_keys]
//! ConfigMap = ["data"]
//! "#).unwrap();
//!
//! assert_eq!(config.label_match, LabelMatch::Exact);
//! assert!(config.fail_fast);
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bundle::LabelMatch;
use crate::document::render::OutputFormat;
use crate::document::Schema;

/// Configuration for the bundlequill tool.
///
/// # Fields
///
/// * `label_match` - how selector labels/annotations compare (default: subset)
/// * `output` - rendering format for `get` (default: yaml)
/// * `fail_fast` - stop validation at the first malformed document (default: true)
/// * `include_gzip` - pick up `*.yaml.gz` files when walking directories (default: true)
/// * `builtin_schema` - start from the built-in per-kind rules (default: true)
/// * `required_keys` - extra required data keys, keyed by `Kind` or `group/Kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub label_match: LabelMatch,

    #[serde(default)]
    pub output: OutputFormat,

    #[serde(default = "default_true")]
    pub fail_fast: bool,

    #[serde(default = "default_true")]
    pub include_gzip: bool,

    #[serde(default = "default_true")]
    pub builtin_schema: bool,

    #[serde(default)]
    pub required_keys: IndexMap<String, Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label_match: LabelMatch::Subset,
            output: OutputFormat::Yaml,
            fail_fast: true,
            include_gzip: true,
            builtin_schema: true,
            required_keys: IndexMap::new(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/bundlequill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("bundlequill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist. A file
    /// that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Builds the validation schema these settings describe.
    pub fn schema(&self) -> Result<Schema> {
        let mut schema = if self.builtin_schema {
            Schema::builtin()
        } else {
            Schema::new()
        };
        schema
            .require_from_rules(&self.required_keys)
            .context("Invalid required_keys in config")?;
        Ok(schema)
    }
}
