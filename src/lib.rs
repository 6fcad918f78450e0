//! # pptx-carousel
//!
//! PowerPoint deck tooling: structural definitions, Morph transitions and
//! template-driven carousel decks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pptx_carousel::{extract_definition, definition_to_json};
//!
//! // Structural snapshot of a deck
//! let definition = extract_definition("deck.pptx")?;
//! println!("Slides: {}", definition.slides.len());
//!
//! // Same snapshot as pretty JSON
//! let json = definition_to_json("deck.pptx")?;
//! std::fs::write("deck_definition.json", json)?;
//! # Ok::<(), pptx_carousel::Error>(())
//! ```
//!
//! ## Carousels
//!
//! ```no_run
//! use pptx_carousel::carousel::{create_carousel, CarouselOptions};
//! use pptx_carousel::events::NullReporter;
//!
//! let summary = create_carousel(
//!     "template_definition.json",
//!     "deck_images",
//!     "carousel.pptx",
//!     &CarouselOptions::default(),
//!     &NullReporter,
//! )?;
//! println!("{} pages, {} pictures", summary.pages, summary.images_placed);
//! # Ok::<(), pptx_carousel::Error>(())
//! ```
//!
//! ## Morph transitions
//!
//! ```no_run
//! use pptx_carousel::pptx::{add_morph_transitions, MorphOptions};
//! use pptx_carousel::events::NullReporter;
//!
//! let count = add_morph_transitions(
//!     "carousel.pptx",
//!     "carousel_morph.pptx",
//!     &MorphOptions::default(),
//!     &NullReporter,
//! )?;
//! # Ok::<(), pptx_carousel::Error>(())
//! ```
//!
//! ## Features
//!
//! - `yaml` (default): YAML definition files via `serde-saphyr`

pub mod carousel;
pub mod compose;
pub mod container;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod pptx;
pub mod render;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use error::{Error, Result};
pub use events::{BuildEvent, NullReporter, Reporter, TracingReporter};
pub use model::{
    DefinitionMetadata, PresentationDefinition, ShapeDefinition, ShapeKind, SlideDefinition,
};
pub use pptx::{extract_definition, ExtractOptions, PptxParser};
pub use render::DefinitionFormat;

use std::path::Path;

/// Extract a definition from bytes of a PPTX package.
///
/// # Example
///
/// ```no_run
/// use pptx_carousel::extract_definition_from_bytes;
///
/// let data = std::fs::read("deck.pptx")?;
/// let definition = extract_definition_from_bytes(data, "deck.pptx")?;
/// # Ok::<(), pptx_carousel::Error>(())
/// ```
pub fn extract_definition_from_bytes(
    data: Vec<u8>,
    source_file: impl Into<String>,
) -> Result<PresentationDefinition> {
    PptxParser::from_bytes(data, source_file)?.parse()
}

/// Extract a deck's definition as pretty-printed JSON.
pub fn definition_to_json(path: impl AsRef<Path>) -> Result<String> {
    let definition = extract_definition(path)?;
    render::to_json(&definition, render::JsonFormat::Pretty)
}

/// Extract a deck's definition as YAML.
#[cfg(feature = "yaml")]
pub fn definition_to_yaml(path: impl AsRef<Path>) -> Result<String> {
    let definition = extract_definition(path)?;
    render::to_yaml(&definition)
}

/// Extract a deck's definition and write it to `output`.
///
/// The format follows `output`'s extension.
///
/// # Example
///
/// ```no_run
/// use pptx_carousel::{save_definition_of, ExtractOptions, NullReporter};
///
/// let definition = save_definition_of(
///     "deck.pptx",
///     "deck_definition.yaml",
///     &ExtractOptions::default().with_max_slides(10),
///     &NullReporter,
/// )?;
/// # Ok::<(), pptx_carousel::Error>(())
/// ```
pub fn save_definition_of(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ExtractOptions,
    reporter: &dyn Reporter,
) -> Result<PresentationDefinition> {
    let output = output.as_ref();
    let format = DefinitionFormat::from_path(output)?;
    let definition = PptxParser::open(input)?.parse_with(options, reporter)?;
    render::save_definition(&definition, output, format)?;
    reporter.report(&BuildEvent::Saved {
        path: output.to_path_buf(),
    });
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmuRect, ImageData};
    use crate::pptx::PresentationWriter;
    use tempfile::TempDir;

    fn deck_bytes() -> Vec<u8> {
        let mut writer = PresentationWriter::from_inches(13.3333, 7.5);
        let png = ImageData::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
            .unwrap();
        writer
            .add_slide()
            .add_picture(png, EmuRect::from_inches(1.0, 1.0, 2.0, 1.0), None, "logo");
        writer.add_slide();
        writer.to_bytes().unwrap()
    }

    #[test]
    fn test_extract_definition_from_bytes() {
        let definition = extract_definition_from_bytes(deck_bytes(), "deck.pptx").unwrap();
        assert_eq!(definition.source_file, "deck.pptx");
        assert_eq!(definition.slides.len(), 2);
        assert_eq!(definition.slides[0].pictures().count(), 1);
    }

    #[test]
    fn test_save_definition_of_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, deck_bytes()).unwrap();

        let err = save_definition_of(
            &input,
            dir.path().join("deck.txt"),
            &ExtractOptions::default(),
            &NullReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_save_definition_of_json() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, deck_bytes()).unwrap();
        let output = dir.path().join("deck_definition.json");

        let definition =
            save_definition_of(&input, &output, &ExtractOptions::default(), &NullReporter)
                .unwrap();
        assert_eq!(render::load_definition(&output).unwrap(), definition);
    }
}
