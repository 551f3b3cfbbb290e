//! Optional `locsync.toml` defaults.
//!
//! ```toml
//! preserve_literal_dots = true
//! sort_keys = true
//! output_format = "json"
//! reference_language = "en"
//! target_language = "de"
//! ```
//!
//! Command-line flags win over file values, file values over built-in defaults.

use std::path::Path;

use locsync::{FormatType, WriteOptions};
use serde::Deserialize;
use tracing::debug;

use crate::validation::{validate_file_path, validate_format, validate_language_code};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "locsync.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub preserve_literal_dots: Option<bool>,
    pub sort_keys: Option<bool>,
    pub output_format: Option<String>,
    pub reference_language: Option<String>,
    pub target_language: Option<String>,
}

impl CliConfig {
    /// Loads `explicit`, or `locsync.toml` from the working directory if it
    /// exists, or returns defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self, String> {
        match explicit {
            Some(path) => {
                validate_file_path(path).map_err(|e| format!("Config file: {}", e))?;
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config {}: {}", path, e))?;
        let config = Self::parse(&text).map_err(|e| format!("Invalid config {}: {}", path, e))?;
        debug!(path, ?config, "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let config: CliConfig = toml::from_str(text).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(format) = &self.output_format {
            validate_format(format)?;
        }
        for lang in [&self.reference_language, &self.target_language].into_iter().flatten() {
            validate_language_code(lang)?;
        }
        Ok(())
    }

    /// Write options after applying the command-line switches. `None` means
    /// the switch was not given and the file value, then `false`, applies.
    pub fn write_options(&self, preserve_literal_dots: Option<bool>, sort_keys: Option<bool>) -> WriteOptions {
        WriteOptions::new()
            .with_preserve_literal_dots(
                preserve_literal_dots
                    .or(self.preserve_literal_dots)
                    .unwrap_or(false),
            )
            .with_sort_keys(sort_keys.or(self.sort_keys).unwrap_or(false))
    }

    /// `flag`, else the configured output format.
    pub fn output_format(&self, flag: Option<&str>) -> Result<Option<FormatType>, String> {
        flag.or(self.output_format.as_deref())
            .map(validate_format)
            .transpose()
    }
}
