//! Building carousel decks from a template layout and slide images.

use super::images::{list_slide_images, SourceImage, DEFAULT_IMAGE_PATTERN};
use super::selector::{select_pages, CarouselPage, Placement};
use super::template::{EdgePanel, EdgePanels, TemplateLayout};
use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use crate::model::EmuRect;
use crate::pptx::{Fill, GradientStop, Outline, PresentationWriter, Rgb, SlideBuilder};
use std::path::Path;

/// Options for carousel decks.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselOptions {
    /// File pattern selecting slide images in the images folder
    pub image_pattern: String,
    pub background: Rgb,
    /// Border drawn around every picture
    pub border: Option<Outline>,
    /// Draw the template's fading edge panels over the pictures
    pub edge_panels: bool,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            image_pattern: DEFAULT_IMAGE_PATTERN.to_string(),
            background: Rgb::BLACK,
            border: Some(Outline::new(Rgb::new(200, 200, 200), 1.0)),
            edge_panels: true,
        }
    }
}

impl CarouselOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.image_pattern = pattern.into();
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn with_border(mut self, border: Option<Outline>) -> Self {
        self.border = border;
        self
    }

    pub fn with_edge_panels(mut self, edge_panels: bool) -> Self {
        self.edge_panels = edge_panels;
        self
    }
}

/// An image assigned to a slot of a page.
#[derive(Debug, Clone, Copy)]
pub struct PlacedImage<'a> {
    pub placement: Placement,
    pub image: &'a SourceImage,
}

/// Draws carousel pages.
pub trait PageRenderer {
    /// Draw one page and return the number of images actually placed.
    ///
    /// Images that cannot be drawn are reported as
    /// [`BuildEvent::ImageSkipped`]; the page is still produced.
    fn render_page(
        &mut self,
        page_number: usize,
        page: &CarouselPage,
        images: &[PlacedImage<'_>],
        reporter: &dyn Reporter,
    ) -> Result<usize>;
}

/// Counts from a finished carousel build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarouselSummary {
    pub pages: usize,
    pub images_placed: usize,
    pub images_skipped: usize,
}

/// Renders pages into a [`PresentationWriter`].
#[derive(Debug)]
pub struct PptxPageRenderer {
    writer: PresentationWriter,
    background: Rgb,
    border: Option<Outline>,
    edge_panels: Option<EdgePanels>,
}

impl PptxPageRenderer {
    /// Create a renderer for pages of the template's slide size.
    pub fn new(layout: &TemplateLayout, options: &CarouselOptions) -> Self {
        Self {
            writer: PresentationWriter::from_inches(
                layout.slide_width_inches,
                layout.slide_height_inches,
            ),
            background: options.background,
            border: options.border,
            edge_panels: layout.edge_panels.filter(|_| options.edge_panels),
        }
    }

    pub fn writer(&self) -> &PresentationWriter {
        &self.writer
    }

    pub fn into_writer(self) -> PresentationWriter {
        self.writer
    }

    /// Write the deck to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.writer.save(path)
    }
}

fn panel_rect(panel: &EdgePanel) -> EmuRect {
    EmuRect::from_inches(panel.left, panel.top, panel.width, panel.height)
}

fn add_edge_panels(slide: &mut SlideBuilder, panels: &EdgePanels) {
    // opaque at the outer edge, transparent toward the center
    let left = Fill::Gradient {
        angle: 0.0,
        stops: [
            GradientStop::new(0.0, Rgb::BLACK, 1.0),
            GradientStop::new(1.0, Rgb::BLACK, 0.0),
        ],
    };
    let right = Fill::Gradient {
        angle: 180.0,
        stops: [
            GradientStop::new(0.0, Rgb::BLACK, 0.0),
            GradientStop::new(1.0, Rgb::BLACK, 1.0),
        ],
    };
    slide.add_rectangle(panel_rect(&panels.left), Some(left), None, panels.left.rotation);
    slide.add_rectangle(panel_rect(&panels.right), Some(right), None, panels.right.rotation);
}

impl PageRenderer for PptxPageRenderer {
    fn render_page(
        &mut self,
        page_number: usize,
        _page: &CarouselPage,
        images: &[PlacedImage<'_>],
        reporter: &dyn Reporter,
    ) -> Result<usize> {
        let slide = self.writer.add_slide();
        slide.set_background(self.background);

        let mut placed = 0;
        for PlacedImage { placement, image } in images {
            let slot = &placement.slot;
            let rect = EmuRect::from_inches(slot.left, slot.top, slot.width, slot.height);
            match slide.add_picture_file(&image.path, rect, self.border) {
                Ok(()) => placed += 1,
                Err(e) => reporter.report(&BuildEvent::ImageSkipped {
                    page: page_number,
                    path: image.path.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        // panels go on top of the pictures
        if let Some(panels) = &self.edge_panels {
            add_edge_panels(slide, panels);
        }
        Ok(placed)
    }
}

/// Lay out one page per image and hand each to `renderer`.
pub fn build_carousel(
    layout: &TemplateLayout,
    images: &[SourceImage],
    renderer: &mut dyn PageRenderer,
    reporter: &dyn Reporter,
) -> Result<CarouselSummary> {
    let pages = select_pages(&layout.patterns, images.len())?;
    reporter.report(&BuildEvent::Started {
        task: "carousel",
        total: pages.len(),
    });

    let mut summary = CarouselSummary::default();
    for (idx, page) in pages.iter().enumerate() {
        let page_number = idx + 1;
        let placed: Vec<PlacedImage<'_>> = page
            .placements(&layout.patterns)
            .into_iter()
            .filter_map(|placement| {
                images
                    .get(placement.image_index)
                    .map(|image| PlacedImage { placement, image })
            })
            .collect();

        let drawn = renderer.render_page(page_number, page, &placed, reporter)?;
        summary.pages += 1;
        summary.images_placed += drawn;
        summary.images_skipped += placed.len() - drawn.min(placed.len());

        reporter.report(&BuildEvent::PageWritten {
            page: page_number,
            total: pages.len(),
            images: drawn,
            center: Some(page.center_index + 1),
        });
    }
    Ok(summary)
}

/// Build a carousel deck from a template definition file and an images folder.
pub fn create_carousel(
    template: impl AsRef<Path>,
    images_folder: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &CarouselOptions,
    reporter: &dyn Reporter,
) -> Result<CarouselSummary> {
    let layout = TemplateLayout::load(template)?;
    let images_folder = images_folder.as_ref();
    let images = list_slide_images(images_folder, &options.image_pattern)?;
    if images.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no images found in {} matching '{}'",
            images_folder.display(),
            options.image_pattern
        )));
    }

    let mut renderer = PptxPageRenderer::new(&layout, options);
    let summary = build_carousel(&layout, &images, &mut renderer, reporter)?;

    let output = output.as_ref();
    renderer.save(output)?;
    reporter.report(&BuildEvent::Saved {
        path: output.to_path_buf(),
    });
    Ok(summary)
}
