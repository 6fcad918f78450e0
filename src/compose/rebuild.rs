//! Rebuilding a deck as full-bleed slide images.

use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use crate::model::{EmuRect, ImageData, PresentationDefinition};
use crate::pptx::PresentationWriter;
use std::path::Path;

/// Options for [`build_from_definition`].
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildOptions {
    pub slide_width_inches: f64,
    pub slide_height_inches: f64,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self {
            slide_width_inches: 16.0,
            slide_height_inches: 9.0,
        }
    }
}

impl RebuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slide_size(mut self, width_inches: f64, height_inches: f64) -> Self {
        self.slide_width_inches = width_inches;
        self.slide_height_inches = height_inches;
        self
    }
}

fn read_image(path: &Path) -> Result<ImageData> {
    if !path.is_file() {
        return Err(Error::MissingComponent(format!(
            "image not found: {}",
            path.display()
        )));
    }
    ImageData::from_bytes(std::fs::read(path)?).ok_or_else(|| {
        Error::ImageFormat(format!("unrecognized image data in {}", path.display()))
    })
}

/// One slide per definition slide, each showing its exported image
/// stretched over the whole page.
///
/// Slides without an image name, or whose image cannot be read, are
/// reported and left out.
pub fn build_from_definition(
    definition: &PresentationDefinition,
    images_folder: impl AsRef<Path>,
    options: &RebuildOptions,
    reporter: &dyn Reporter,
) -> Result<PresentationWriter> {
    let images_folder = images_folder.as_ref();
    let mut writer =
        PresentationWriter::from_inches(options.slide_width_inches, options.slide_height_inches);
    let (width, height) = writer.slide_size();
    let total = definition.slides.len();

    reporter.report(&BuildEvent::Started {
        task: "rebuild",
        total,
    });

    for slide_def in &definition.slides {
        let Some(name) = slide_def.slide_image.as_deref().filter(|n| !n.is_empty()) else {
            reporter.report(&BuildEvent::SlideSkipped {
                slide: slide_def.index,
                reason: "no image file specified".to_string(),
            });
            continue;
        };

        let image = match read_image(&images_folder.join(name)) {
            Ok(image) => image,
            Err(e) => {
                reporter.report(&BuildEvent::SlideSkipped {
                    slide: slide_def.index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        writer
            .add_slide()
            .add_picture(image, EmuRect::new(0, 0, width, height), None, name);
        reporter.report(&BuildEvent::PageWritten {
            page: writer.slide_count(),
            total,
            images: 1,
            center: None,
        });
    }

    Ok(writer)
}

/// Load a definition file, rebuild it and save the deck.
///
/// Returns the number of slides written.
pub fn rebuild_presentation(
    definition: impl AsRef<Path>,
    images_folder: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &RebuildOptions,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let images_folder = images_folder.as_ref();
    if !images_folder.is_dir() {
        return Err(Error::InvalidInput(format!(
            "images folder not found: {}",
            images_folder.display()
        )));
    }

    let definition = crate::render::load_definition(definition)?;
    let writer = build_from_definition(&definition, images_folder, options, reporter)?;
    let output = output.as_ref();
    writer.save(output)?;
    reporter.report(&BuildEvent::Saved {
        path: output.to_path_buf(),
    });
    Ok(writer.slide_count())
}
