//! JSON definition output.

use crate::error::Result;
use crate::model::PresentationDefinition;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a definition to JSON.
pub fn to_json(definition: &PresentationDefinition, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(definition)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(definition)?,
    };
    Ok(json)
}

/// Parse a definition from JSON.
pub fn from_json(json: &str) -> Result<PresentationDefinition> {
    Ok(serde_json::from_str(json)?)
}
