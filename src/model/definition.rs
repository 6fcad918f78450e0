//! Presentation definition structures.
//!
//! A definition is a structural snapshot of a deck: slide size, and for each
//! slide the shapes with their geometry in inches, text, tables and charts.
//! It is what the carousel template loader and the rebuild builder consume.

use serde::{Deserialize, Serialize};

/// Deck-level measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionMetadata {
    /// Slide width in inches
    pub slide_width_inches: f64,

    /// Slide height in inches
    pub slide_height_inches: f64,

    /// Number of slides in the source deck
    pub slide_count: usize,
}

/// Kind of shape, as named in definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    AutoShape,
    Chart,
    Picture,
    Placeholder,
    Group,
    Line,
    Table,
    TextBox,
    Media,
    Freeform,
    OleObject,
    /// Graphic frame with content this crate does not classify
    Other,
}

impl ShapeKind {
    /// Name used in serialized definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::AutoShape => "auto_shape",
            ShapeKind::Chart => "chart",
            ShapeKind::Picture => "picture",
            ShapeKind::Placeholder => "placeholder",
            ShapeKind::Group => "group",
            ShapeKind::Line => "line",
            ShapeKind::Table => "table",
            ShapeKind::TextBox => "text_box",
            ShapeKind::Media => "media",
            ShapeKind::Freeform => "freeform",
            ShapeKind::OleObject => "ole_object",
            ShapeKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level font properties. Unset properties are inherited in the deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontDefinition {
    pub name: Option<String>,
    pub size_pt: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Explicit RGB color as `#RRGGBB`
    pub color_hex: Option<String>,
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDefinition {
    pub text: String,
    pub font: FontDefinition,
}

/// A paragraph inside a text frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphDefinition {
    /// `left`, `center`, `right`, `justify`, `distributed`, ...
    pub alignment: Option<String>,
    pub runs: Vec<RunDefinition>,
}

impl ParagraphDefinition {
    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    pub text: String,
    pub row_span: Option<u32>,
    pub col_span: Option<u32>,
}

/// A table inside a graphic frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub rows: Vec<Vec<CellDefinition>>,
    pub row_count: usize,
    pub column_count: usize,
}

/// Summary of an embedded chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    /// Plot element name, e.g. `barChart`
    pub chart_type: String,
    pub has_legend: bool,
    pub series_count: usize,
    pub categories_count: Option<usize>,
}

/// A direct child of a group shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupChild {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub left_inches: f64,
    pub top_inches: f64,
    pub width_inches: f64,
    pub height_inches: f64,
    pub text: Option<String>,
}

/// A shape on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDefinition {
    pub id: Option<u32>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub left_inches: f64,
    pub top_inches: f64,
    pub width_inches: f64,
    pub height_inches: f64,
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub has_text_frame: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paragraphs: Option<Vec<ParagraphDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub table: Option<TableDefinition>,

    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub is_picture: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group_children: Option<Vec<GroupChild>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chart: Option<ChartSummary>,
}

impl ShapeDefinition {
    /// Create a shape with geometry and no content.
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            left_inches: 0.0,
            top_inches: 0.0,
            width_inches: 0.0,
            height_inches: 0.0,
            rotation: 0.0,
            has_text_frame: false,
            text: None,
            paragraphs: None,
            table: None,
            is_picture: kind == ShapeKind::Picture,
            group_children: None,
            chart: None,
        }
    }

    /// Set position and size in inches.
    pub fn with_geometry(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.left_inches = left;
        self.top_inches = top;
        self.width_inches = width;
        self.height_inches = height;
        self
    }
}

/// One slide of a definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideDefinition {
    /// 1-based slide number
    pub index: usize,
    pub layout_name: Option<String>,
    /// File name of the exported slide image, if any
    pub slide_image: Option<String>,
    pub shapes: Vec<ShapeDefinition>,
    pub notes: Option<String>,
}

impl SlideDefinition {
    /// Picture shapes on the slide.
    pub fn pictures(&self) -> impl Iterator<Item = &ShapeDefinition> {
        self.shapes.iter().filter(|s| s.is_picture)
    }

    /// Shapes of the given kind.
    pub fn shapes_of_kind(&self, kind: ShapeKind) -> impl Iterator<Item = &ShapeDefinition> {
        self.shapes.iter().filter(move |s| s.kind == kind)
    }
}

/// Structural definition of a whole deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationDefinition {
    /// File name of the source deck
    pub source_file: String,
    pub metadata: DefinitionMetadata,
    pub slides: Vec<SlideDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_names() {
        assert_eq!(ShapeKind::AutoShape.to_string(), "auto_shape");
        let json = serde_json::to_string(&ShapeKind::TextBox).unwrap();
        assert_eq!(json, "\"text_box\"");
    }

    #[test]
    fn test_shape_serializes_type_key() {
        let shape = ShapeDefinition::new("Picture 3", ShapeKind::Picture)
            .with_geometry(1.0, 2.0, 3.0, 4.0);
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "picture");
        assert_eq!(value["is_picture"], true);
        assert!(value.get("table").is_none());
    }

    #[test]
    fn test_non_picture_omits_flag() {
        let shape = ShapeDefinition::new("Rectangle 1", ShapeKind::AutoShape);
        let value = serde_json::to_value(&shape).unwrap();
        assert!(value.get("is_picture").is_none());
    }

    #[test]
    fn test_deserialize_minimal_shape() {
        let json = r#"{
            "id": 4, "name": "Picture 3", "type": "picture",
            "left_inches": 0.5, "top_inches": 1.0,
            "width_inches": 4.0, "height_inches": 2.25,
            "is_picture": true
        }"#;
        let shape: ShapeDefinition = serde_json::from_str(json).unwrap();
        assert!(shape.is_picture);
        assert_eq!(shape.rotation, 0.0);
        assert!(shape.paragraphs.is_none());
    }

    #[test]
    fn test_slide_filters() {
        let slide = SlideDefinition {
            index: 1,
            shapes: vec![
                ShapeDefinition::new("Picture 1", ShapeKind::Picture),
                ShapeDefinition::new("Rectangle 2", ShapeKind::AutoShape),
                ShapeDefinition::new("Picture 3", ShapeKind::Picture),
            ],
            ..Default::default()
        };
        assert_eq!(slide.pictures().count(), 2);
        assert_eq!(slide.shapes_of_kind(ShapeKind::AutoShape).count(), 1);
    }
}
