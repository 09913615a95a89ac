//! Configuration file support for the endbib CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [convert]
//! suppress_missing_field_warnings = false
//! extract_styled_text = true
//!
//! [output]
//! directory = "bib"
//! file_name = "converted.bib"
//!
//! [logging]
//! file = "endbib.log"
//! level = "info"
//! ```
//!
//! Every section and key is optional.

use endbib::ConvertOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "endbib.toml";

/// Default name of the file written into an output directory.
pub const DEFAULT_OUTPUT_NAME: &str = "converted.bib";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Conversion options; command line flags can only turn these on
    #[serde(default)]
    pub convert: ConvertOptions,

    /// Output section
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging section
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where converted files go when no output is named.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Default save directory
    pub directory: Option<PathBuf>,
    /// File name used inside an output directory
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Append log lines to this file instead of stderr
    pub file: Option<PathBuf>,
    /// Filter directive used when neither `-v` nor `RUST_LOG` is set
    pub level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `explicit` if given, else `endbib.toml` in the working directory
    /// if it exists, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
