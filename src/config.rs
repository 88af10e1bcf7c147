//! Build options
//!
//! Options come from an optional TOML file and are overridden by CLI flags:
//!
//! ```toml
//! model_trailers = "strip"
//! script_extensions = ["py"]
//! ```

use crate::error::{PackError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How model converter output is treated by the sniffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTrailerPolicy {
    /// Recognise the model magic, strip the 28-byte extents trailer and
    /// record extents plus the schema version in the manifest
    #[default]
    Strip,

    /// Do not recognise the model magic; models pack verbatim as generic data
    Generic,
}

impl FromStr for ModelTrailerPolicy {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strip" => Ok(Self::Strip),
            "generic" => Ok(Self::Generic),
            other => Err(PackError::Config(format!(
                "unknown model trailer policy '{}' (expected 'strip' or 'generic')",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelTrailerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strip => f.write_str("strip"),
            Self::Generic => f.write_str("generic"),
        }
    }
}

/// Options for a single pack build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackOptions {
    /// Model trailer sniffing mode
    pub model_trailers: ModelTrailerPolicy,

    /// File extensions (without the dot) that mark script sources
    pub script_extensions: Vec<String>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            model_trailers: ModelTrailerPolicy::default(),
            script_extensions: vec!["py".to_string()],
        }
    }
}

impl PackOptions {
    /// Parse options from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PackError::file(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Override the model trailer policy
    pub fn with_model_trailers(mut self, policy: ModelTrailerPolicy) -> Self {
        self.model_trailers = policy;
        self
    }

    /// Whether `name` is a script source by extension.
    ///
    /// Matches on the name's suffix, so a bare `.py` counts as a script.
    pub fn is_script(&self, name: &str) -> bool {
        self.script_extensions.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_str())
                && name[..name.len() - ext.len()].ends_with('.')
        })
    }
}
