//! One-shot carousel creation from a finished deck.
//!
//! The pipeline extracts the deck's definition, renders its slides to
//! images, lays the images out with a template definition and finally
//! removes the intermediate files.

use crate::carousel::{create_carousel, CarouselOptions, CarouselSummary};
use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use crate::export::{export_definition_images, SlideImageExporter};
use crate::pptx::{ExtractOptions, PptxParser};
use crate::render::{save_definition, DefinitionFormat};
use std::path::{Path, PathBuf};

/// Options for [`create_carousel_end_to_end`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    /// Leave the definition file and image folder in place
    pub keep_temp: bool,
    pub extract: ExtractOptions,
    pub carousel: CarouselOptions,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_temp(mut self, keep_temp: bool) -> Self {
        self.keep_temp = keep_temp;
        self
    }

    pub fn with_extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_carousel(mut self, carousel: CarouselOptions) -> Self {
        self.carousel = carousel;
        self
    }
}

/// Intermediate paths derived from the input deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempPaths {
    /// `<stem>_definition.json` next to the input
    pub definition: PathBuf,
    /// `<stem>_images` next to the input
    pub images: PathBuf,
}

impl TempPaths {
    pub fn for_input(input: impl AsRef<Path>) -> Self {
        let input = input.as_ref();
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "presentation".to_string());
        Self {
            definition: parent.join(format!("{}_definition.json", stem)),
            images: parent.join(format!("{}_images", stem)),
        }
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub slides_exported: usize,
    pub carousel: CarouselSummary,
    pub temp: TempPaths,
    /// Whether the temporaries are still on disk
    pub kept_temp: bool,
}

/// Turn `input` into a carousel deck at `output` laid out by `template`.
///
/// Temporaries are removed only after the carousel was written; failing to
/// remove them is logged, not returned.
pub fn create_carousel_end_to_end(
    input: impl AsRef<Path>,
    template: impl AsRef<Path>,
    output: impl AsRef<Path>,
    exporter: &dyn SlideImageExporter,
    options: &PipelineOptions,
    reporter: &dyn Reporter,
) -> Result<PipelineSummary> {
    let input = input.as_ref();
    let template = template.as_ref();
    if !input.is_file() {
        return Err(Error::InvalidInput(format!(
            "input file not found: {}",
            input.display()
        )));
    }
    if !template.is_file() {
        return Err(Error::InvalidInput(format!(
            "template definition not found: {}",
            template.display()
        )));
    }

    let temp = TempPaths::for_input(input);
    tracing::info!(
        input = %input.display(),
        template = %template.display(),
        definition = %temp.definition.display(),
        images = %temp.images.display(),
        "starting end-to-end carousel"
    );

    let mut definition = PptxParser::open(input)?.parse_with(&options.extract, reporter)?;
    let slides_exported =
        export_definition_images(&mut definition, input, exporter, &temp.images, reporter)?;
    save_definition(&definition, &temp.definition, DefinitionFormat::Json)?;
    reporter.report(&BuildEvent::Saved {
        path: temp.definition.clone(),
    });

    let carousel = create_carousel(template, &temp.images, output, &options.carousel, reporter)?;

    if !options.keep_temp {
        remove_temporaries(&temp, reporter);
    }

    Ok(PipelineSummary {
        slides_exported,
        carousel,
        temp,
        kept_temp: options.keep_temp,
    })
}

fn remove_temporaries(temp: &TempPaths, reporter: &dyn Reporter) {
    if temp.definition.exists() {
        match std::fs::remove_file(&temp.definition) {
            Ok(()) => reporter.report(&BuildEvent::Removed {
                path: temp.definition.clone(),
            }),
            Err(e) => tracing::warn!(
                path = %temp.definition.display(),
                "could not remove definition: {}",
                e
            ),
        }
    }
    if temp.images.exists() {
        match std::fs::remove_dir_all(&temp.images) {
            Ok(()) => reporter.report(&BuildEvent::Removed {
                path: temp.images.clone(),
            }),
            Err(e) => tracing::warn!(
                path = %temp.images.display(),
                "could not remove image folder: {}",
                e
            ),
        }
    }
}
