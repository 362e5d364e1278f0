//! Configuration loader for authgate
//!
//! Dispatches on the file extension: `.json` is parsed as JSON, `.yaml` and
//! `.yml` as YAML, anything else as TOML. The same loader reads the main
//! service file and the rights table.

use authgate_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;

/// Structured-data formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file name; unknown extensions are TOML
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => ConfigFormat::Json,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Toml => "TOML",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse configuration text in the given format.
///
/// `origin` only labels errors.
pub fn parse_str<T: DeserializeOwned>(text: &str, format: ConfigFormat, origin: &Path) -> Result<T> {
    let name = format.name();
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(text).map_err(|e| Error::config_parse(origin, name, e))
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| Error::config_parse(origin, name, e))
        }
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| Error::config_parse(origin, name, e)),
    }
}

/// Read and parse a file in the format its extension names
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path);

    tracing::debug!(path = %path.display(), format = %format, "loading config file");

    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read config", e))?;

    parse_str(&text, format, path)
}
