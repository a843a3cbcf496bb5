//! Settings and metadata files, YAML or TOML by extension

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// File formats the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// `.yml` / `.yaml`: the sync settings file
    Yaml,
    /// `.toml`: snapshot metadata
    Toml,
}

impl Format {
    fn of(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        }
    }
}

/// Reads and writes serde values, choosing the format from the extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Parse `path` into `T`.
    ///
    /// A blank YAML file parses as an empty mapping, so settings structs with
    /// `#[serde(default)]` come back as their defaults.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = Format::of(path)?;
        let text = io::read_text(path)?;

        let parsed = match format {
            Format::Yaml if text.trim().is_empty() => {
                serde_yaml::from_str("{}").map_err(|e| e.to_string())
            }
            Format::Yaml => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(&text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().to_string(),
            message,
        })
    }

    /// Serialize `value` and write it atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = Format::of(path)?;
        let rendered = match format {
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            Format::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        let text = rendered.map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.name().to_string(),
            message,
        })?;
        io::write_text(path, &text)
    }
}
