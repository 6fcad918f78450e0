//! YAML definition output.

use crate::error::{Error, Result};
use crate::model::PresentationDefinition;

/// Convert a definition to YAML.
pub fn to_yaml(definition: &PresentationDefinition) -> Result<String> {
    serde_saphyr::to_string(definition)
        .map_err(|e| Error::Serialization(format!("failed to serialize definition to YAML: {}", e)))
}

/// Parse a definition from YAML.
pub fn from_yaml(yaml: &str) -> Result<PresentationDefinition> {
    serde_saphyr::from_str(yaml)
        .map_err(|e| Error::Serialization(format!("failed to parse YAML definition: {}", e)))
}
