//! Template layouts read from reference-deck definitions.

use super::selector::{PictureSlot, TemplatePattern, TemplateSet};
use crate::error::{Error, Result};
use crate::model::{PresentationDefinition, ShapeDefinition, ShapeKind};
use std::path::Path;

/// A decorative rectangle from the template, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePanel {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees
    pub rotation: f64,
}

impl From<&ShapeDefinition> for EdgePanel {
    fn from(shape: &ShapeDefinition) -> Self {
        Self {
            left: shape.left_inches,
            top: shape.top_inches,
            width: shape.width_inches,
            height: shape.height_inches,
            rotation: shape.rotation,
        }
    }
}

/// The fade-out panels drawn over the outer edges of every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePanels {
    pub left: EdgePanel,
    pub right: EdgePanel,
}

/// Everything the carousel builder takes from a reference deck.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLayout {
    pub source_file: String,
    pub slide_width_inches: f64,
    pub slide_height_inches: f64,
    pub patterns: TemplateSet,
    /// Present when the first template slide has at least two auto shapes
    pub edge_panels: Option<EdgePanels>,
}

impl TemplateLayout {
    /// Derive a layout from a definition.
    ///
    /// Each slide contributes one pattern built from its picture shapes,
    /// ordered left to right. The two leftmost auto shapes of the first
    /// slide become the edge panels.
    pub fn from_definition(definition: &PresentationDefinition) -> Result<Self> {
        let first = definition.slides.first().ok_or_else(|| {
            Error::InvalidInput("template definition has no slides".to_string())
        })?;

        let patterns = definition
            .slides
            .iter()
            .map(|slide| {
                TemplatePattern::new(
                    slide
                        .pictures()
                        .map(|p| {
                            PictureSlot::new(
                                p.left_inches,
                                p.top_inches,
                                p.width_inches,
                                p.height_inches,
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        let mut panels: Vec<&ShapeDefinition> =
            first.shapes_of_kind(ShapeKind::AutoShape).collect();
        panels.sort_by(|a, b| a.left_inches.total_cmp(&b.left_inches));
        let edge_panels = match panels.as_slice() {
            [left, right, ..] => Some(EdgePanels {
                left: EdgePanel::from(*left),
                right: EdgePanel::from(*right),
            }),
            _ => None,
        };

        let layout = Self {
            source_file: definition.source_file.clone(),
            slide_width_inches: definition.metadata.slide_width_inches,
            slide_height_inches: definition.metadata.slide_height_inches,
            patterns: TemplateSet::new(patterns),
            edge_panels,
        };
        tracing::debug!(
            source = %layout.source_file,
            patterns = layout.patterns.len(),
            edge_panels = layout.edge_panels.is_some(),
            "loaded template layout"
        );
        Ok(layout)
    }

    /// Load a definition file (JSON or YAML) and derive its layout.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let definition = crate::render::load_definition(path)?;
        Self::from_definition(&definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefinitionMetadata, SlideDefinition};

    fn picture(left: f64) -> ShapeDefinition {
        ShapeDefinition::new("Picture", ShapeKind::Picture).with_geometry(left, 2.0, 3.0, 1.7)
    }

    fn panel(left: f64, rotation: f64) -> ShapeDefinition {
        let mut shape = ShapeDefinition::new("Rectangle", ShapeKind::AutoShape)
            .with_geometry(left, 0.0, 2.0, 7.5);
        shape.rotation = rotation;
        shape
    }

    fn definition(slides: Vec<Vec<ShapeDefinition>>) -> PresentationDefinition {
        PresentationDefinition {
            source_file: "Carousel Template.pptx".to_string(),
            metadata: DefinitionMetadata {
                slide_width_inches: 13.3333,
                slide_height_inches: 7.5,
                slide_count: slides.len(),
            },
            slides: slides
                .into_iter()
                .enumerate()
                .map(|(i, shapes)| SlideDefinition {
                    index: i + 1,
                    shapes,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_patterns_per_slide_sorted() {
        let def = definition(vec![
            vec![picture(9.0), picture(1.0), picture(5.0)],
            vec![picture(0.5), picture(3.0), picture(6.0), picture(9.5)],
        ]);
        let layout = TemplateLayout::from_definition(&def).unwrap();
        assert_eq!(layout.patterns.len(), 2);
        let lefts: Vec<f64> = layout.patterns.patterns()[0]
            .slots()
            .iter()
            .map(|s| s.left)
            .collect();
        assert_eq!(lefts, vec![1.0, 5.0, 9.0]);
        assert_eq!(layout.patterns.patterns()[1].len(), 4);
        assert_eq!(layout.slide_width_inches, 13.3333);
    }

    #[test]
    fn test_edge_panels_from_first_slide() {
        let def = definition(vec![
            vec![panel(11.3, 180.0), picture(4.0), panel(0.0, 0.0)],
            vec![picture(4.0), panel(5.0, 0.0), panel(6.0, 0.0)],
        ]);
        let layout = TemplateLayout::from_definition(&def).unwrap();
        let panels = layout.edge_panels.unwrap();
        assert_eq!(panels.left.left, 0.0);
        assert_eq!(panels.right.left, 11.3);
        assert_eq!(panels.right.rotation, 180.0);
    }

    #[test]
    fn test_single_panel_is_ignored() {
        let def = definition(vec![vec![panel(0.0, 0.0), picture(4.0)]]);
        let layout = TemplateLayout::from_definition(&def).unwrap();
        assert!(layout.edge_panels.is_none());
    }

    #[test]
    fn test_empty_definition() {
        let err = TemplateLayout::from_definition(&definition(vec![])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_slide_without_pictures_fails_validation() {
        let def = definition(vec![vec![picture(1.0)], vec![panel(0.0, 0.0)]]);
        let layout = TemplateLayout::from_definition(&def).unwrap();
        assert!(layout.patterns.validate().is_err());
    }
}
