//! Pipeline configuration and the optional TOML configuration file

use crate::error::{Error, Result};
use crate::filter::JunkRules;
use serde::Deserialize;
use std::path::Path;

/// Everything the loading pipeline needs, passed down explicitly.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Keep generator bookkeeping nodes instead of removing them.
    pub keep_junk: bool,
    /// Regular expressions matched against node identifiers.
    pub exclude: Vec<String>,
    pub junk_rules: JunkRules,
}

/// Junk rule overrides from the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JunkSection {
    /// Patterns added to the built-in ones.
    pub extra_patterns: Vec<String>,
    /// Use only `extra_patterns`, dropping the built-in rules.
    pub replace_defaults: bool,
}

/// Contents of a `tfviz.toml` style file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub keep_tf_junk: Option<bool>,
    pub exclude: Vec<String>,
    pub embed_modules: Option<bool>,
    pub graph_name: Option<String>,
    pub output_type: Option<String>,
    pub cyto_html_template: Option<String>,
    pub junk: JunkSection,
}

impl FileConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("cannot read the configuration file {}", path.display()),
                e,
            )
        })?;
        let config = Self::from_toml(&source)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Junk rules described by the `[junk]` section.
    pub fn junk_rules(&self) -> Result<JunkRules> {
        let rules = if self.junk.replace_defaults {
            JunkRules::new(&self.junk.extra_patterns)?
        } else {
            let mut rules = JunkRules::default();
            rules.extend(&self.junk.extra_patterns)?;
            rules
        };
        if rules.is_empty() {
            tracing::warn!("No junk rules configured, every node will be kept");
        }
        Ok(rules)
    }
}
