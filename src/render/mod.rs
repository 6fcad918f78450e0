//! Definition serialization.
//!
//! Definitions are written as JSON (pretty or compact) or, with the `yaml`
//! feature, YAML. Loading picks the format from the file extension.
//!
//! # Example
//!
//! ```no_run
//! use pptx_carousel::render::{load_definition, save_definition, DefinitionFormat};
//!
//! let definition = load_definition("deck_definition.json")?;
//! save_definition(&definition, "deck_definition.json", DefinitionFormat::Json)?;
//! # Ok::<(), pptx_carousel::Error>(())
//! ```

mod json;
#[cfg(feature = "yaml")]
mod yaml;

pub use json::{from_json, to_json, JsonFormat};
#[cfg(feature = "yaml")]
pub use yaml::{from_yaml, to_yaml};

use crate::error::{Error, Result};
use crate::model::PresentationDefinition;
use std::path::Path;

/// On-disk definition format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefinitionFormat {
    #[default]
    Json,
    Yaml,
}

impl DefinitionFormat {
    /// Format implied by a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(DefinitionFormat::Json),
            "yaml" | "yml" => Ok(DefinitionFormat::Yaml),
            _ => Err(Error::UnsupportedFormat(format!(
                "unsupported definition file '{}'; use .json, .yaml or .yml",
                path.display()
            ))),
        }
    }

    /// Preferred file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            DefinitionFormat::Json => "json",
            DefinitionFormat::Yaml => "yaml",
        }
    }
}

impl std::str::FromStr for DefinitionFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DefinitionFormat::Json),
            "yaml" | "yml" => Ok(DefinitionFormat::Yaml),
            other => Err(Error::UnsupportedFormat(format!(
                "unknown definition format: {}",
                other
            ))),
        }
    }
}

/// Serialize a definition in the given format.
pub fn to_string(definition: &PresentationDefinition, format: DefinitionFormat) -> Result<String> {
    match format {
        DefinitionFormat::Json => to_json(definition, JsonFormat::Pretty),
        #[cfg(feature = "yaml")]
        DefinitionFormat::Yaml => to_yaml(definition),
        #[cfg(not(feature = "yaml"))]
        DefinitionFormat::Yaml => Err(Error::UnsupportedFormat(
            "YAML support is not enabled (build with the `yaml` feature)".to_string(),
        )),
    }
}

/// Parse a definition in the given format.
pub fn from_string(content: &str, format: DefinitionFormat) -> Result<PresentationDefinition> {
    match format {
        DefinitionFormat::Json => from_json(content),
        #[cfg(feature = "yaml")]
        DefinitionFormat::Yaml => from_yaml(content),
        #[cfg(not(feature = "yaml"))]
        DefinitionFormat::Yaml => Err(Error::UnsupportedFormat(
            "YAML support is not enabled (build with the `yaml` feature)".to_string(),
        )),
    }
}

/// Write a definition to `path`.
pub fn save_definition(
    definition: &PresentationDefinition,
    path: impl AsRef<Path>,
    format: DefinitionFormat,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_string(definition, format)?)?;
    tracing::debug!(path = %path.display(), ?format, "saved definition");
    Ok(())
}

/// Read a definition, choosing the format from the extension.
pub fn load_definition(path: impl AsRef<Path>) -> Result<PresentationDefinition> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    from_string(&content, format)
}
