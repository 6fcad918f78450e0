//! Grid carousel: pages of slide thumbnails with titles and number labels.

use crate::carousel::{list_slide_images, SourceImage, DEFAULT_IMAGE_PATTERN};
use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use crate::model::EmuRect;
use crate::pptx::{Outline, PresentationWriter, Rgb, TextAlign, TextStyle};
use std::path::Path;

const MARGIN: f64 = 0.5;
const SPACING: f64 = 0.3;
const TITLE_BAND: f64 = 1.0;
const NO_TITLE_BAND: f64 = 0.2;
const LABEL_WIDTH: f64 = 0.6;
const LABEL_HEIGHT: f64 = 0.35;
const LABEL_OFFSET: f64 = 0.4;

/// Largest page a grid can hold (3 x 3).
pub const MAX_SLIDES_PER_PAGE: usize = 9;

/// Options for grid carousels.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub slides_per_page: usize,
    pub slide_width_inches: f64,
    pub slide_height_inches: f64,
    /// Add a "Slides a - b" title to each page
    pub titles: bool,
    /// Outline each thumbnail
    pub borders: bool,
    pub image_pattern: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            slides_per_page: 4,
            slide_width_inches: 16.0,
            slide_height_inches: 9.0,
            titles: true,
            borders: true,
            image_pattern: DEFAULT_IMAGE_PATTERN.to_string(),
        }
    }
}

impl GridOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slides_per_page(mut self, slides_per_page: usize) -> Self {
        self.slides_per_page = slides_per_page;
        self
    }

    pub fn with_slide_size(mut self, width_inches: f64, height_inches: f64) -> Self {
        self.slide_width_inches = width_inches;
        self.slide_height_inches = height_inches;
        self
    }

    pub fn with_titles(mut self, titles: bool) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_borders(mut self, borders: bool) -> Self {
        self.borders = borders;
        self
    }

    pub fn with_image_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.image_pattern = pattern.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.slides_per_page == 0 || self.slides_per_page > MAX_SLIDES_PER_PAGE {
            return Err(Error::InvalidInput(format!(
                "slides per page must be between 1 and {}, got {}",
                MAX_SLIDES_PER_PAGE, self.slides_per_page
            )));
        }
        Ok(())
    }
}

/// Columns and rows used for `count` thumbnails.
pub fn grid_shape(count: usize) -> (usize, usize) {
    match count {
        0..=2 => (count.max(1), 1),
        3..=4 => (2, 2),
        5..=6 => (3, 2),
        _ => (3, 3),
    }
}

/// Thumbnail rectangle in inches (left, top, width, height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Thumbnail rectangles for a page of `count` images, in reading order.
pub fn grid_cells(count: usize, options: &GridOptions) -> Vec<Cell> {
    let (cols, rows) = grid_shape(count);
    let band = if options.titles { TITLE_BAND } else { NO_TITLE_BAND };
    let available_width = options.slide_width_inches - 2.0 * MARGIN;
    let available_height = options.slide_height_inches - band - MARGIN;
    let width = (available_width - SPACING * (cols as f64 - 1.0)) / cols as f64;
    let height = (available_height - SPACING * (rows as f64 - 1.0)) / rows as f64;

    (0..count)
        .map(|idx| {
            let (row, col) = (idx / cols, idx % cols);
            Cell {
                left: MARGIN + col as f64 * (width + SPACING),
                top: band + row as f64 * (height + SPACING),
                width,
                height,
            }
        })
        .collect()
}

/// Lay out `images` as grid pages.
pub fn build_grid_carousel(
    images: &[SourceImage],
    options: &GridOptions,
    reporter: &dyn Reporter,
) -> Result<PresentationWriter> {
    options.validate()?;

    let mut writer =
        PresentationWriter::from_inches(options.slide_width_inches, options.slide_height_inches);
    let pages: Vec<&[SourceImage]> = images.chunks(options.slides_per_page).collect();
    reporter.report(&BuildEvent::Started {
        task: "grid",
        total: pages.len(),
    });

    let border = options
        .borders
        .then(|| Outline::new(Rgb::new(180, 180, 180), 2.0));
    let title_style = TextStyle::new(32.0)
        .bold(true)
        .color(Rgb::new(50, 50, 50))
        .align(TextAlign::Center);
    let label_style = TextStyle::new(18.0)
        .bold(true)
        .color(Rgb::WHITE)
        .align(TextAlign::Center);

    for (page_idx, page_images) in pages.iter().enumerate() {
        let first = page_idx * options.slides_per_page + 1;
        let slide = writer.add_slide();
        slide.set_background(Rgb::new(245, 245, 245));

        if options.titles {
            let last = first + page_images.len() - 1;
            slide.add_text_box(
                EmuRect::from_inches(
                    MARGIN,
                    0.3,
                    options.slide_width_inches - 2.0 * MARGIN,
                    0.6,
                ),
                format!("Slides {} - {}", first, last),
                title_style.clone(),
                None,
            );
        }

        let mut placed = 0;
        for (offset, (image, cell)) in page_images
            .iter()
            .zip(grid_cells(page_images.len(), options))
            .enumerate()
        {
            let rect = EmuRect::from_inches(cell.left, cell.top, cell.width, cell.height);
            if let Err(e) = slide.add_picture_file(&image.path, rect, border) {
                reporter.report(&BuildEvent::ImageSkipped {
                    page: page_idx + 1,
                    path: image.path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            placed += 1;

            slide.add_text_box(
                EmuRect::from_inches(
                    cell.left,
                    cell.top + cell.height - LABEL_OFFSET,
                    LABEL_WIDTH,
                    LABEL_HEIGHT,
                ),
                (first + offset).to_string(),
                label_style.clone(),
                Some(Rgb::new(50, 50, 150)),
            );
        }

        reporter.report(&BuildEvent::PageWritten {
            page: page_idx + 1,
            total: pages.len(),
            images: placed,
            center: None,
        });
    }

    Ok(writer)
}

/// Build a grid carousel from an images folder and save it.
///
/// Returns the number of pages written.
pub fn create_grid_carousel(
    images_folder: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &GridOptions,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let images_folder = images_folder.as_ref();
    let images = list_slide_images(images_folder, &options.image_pattern)?;
    if images.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no images found in {} matching '{}'",
            images_folder.display(),
            options.image_pattern
        )));
    }

    let writer = build_grid_carousel(&images, options, reporter)?;
    let output = output.as_ref();
    writer.save(output)?;
    reporter.report(&BuildEvent::Saved {
        path: output.to_path_buf(),
    });
    Ok(writer.slide_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, NullReporter};
    use crate::pptx::Shape;
    use std::path::PathBuf;

    fn images(n: usize) -> Vec<SourceImage> {
        (1..=n)
            .map(|i| SourceImage {
                index: i,
                path: PathBuf::from(format!("/nonexistent/slide_{:03}.png", i)),
            })
            .collect()
    }

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(2), (2, 1));
        assert_eq!(grid_shape(3), (2, 2));
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(5), (3, 2));
        assert_eq!(grid_shape(6), (3, 2));
        assert_eq!(grid_shape(7), (3, 3));
        assert_eq!(grid_shape(9), (3, 3));
    }

    #[test]
    fn test_grid_cells_2x2() {
        let cells = grid_cells(4, &GridOptions::default());
        // 15in wide minus one gap, split in two; 7.5in tall minus one gap
        assert!((cells[0].width - 7.35).abs() < 1e-9);
        assert!((cells[0].height - 3.6).abs() < 1e-9);
        assert_eq!(cells[0].left, 0.5);
        assert_eq!(cells[0].top, 1.0);
        assert!((cells[3].left - (0.5 + 7.35 + 0.3)).abs() < 1e-9);
        assert!((cells[3].top - (1.0 + 3.6 + 0.3)).abs() < 1e-9);
    }

    #[test]
    fn test_grid_cells_without_titles() {
        let options = GridOptions::default().with_titles(false);
        let cells = grid_cells(1, &options);
        assert_eq!(cells[0].top, 0.2);
        assert!((cells[0].height - 8.3).abs() < 1e-9);
    }

    #[test]
    fn test_pages_and_titles() {
        let log = EventLog::new();
        let writer = build_grid_carousel(&images(6), &GridOptions::default(), &log).unwrap();
        assert_eq!(writer.slide_count(), 2);

        let titles: Vec<&str> = writer
            .slides()
            .iter()
            .filter_map(|s| match s.shapes().first() {
                Some(Shape::TextBox { text, .. }) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Slides 1 - 4", "Slides 5 - 6"]);
        assert_eq!(log.count(|e| matches!(e, BuildEvent::ImageSkipped { .. })), 6);
    }

    #[test]
    fn test_invalid_slides_per_page() {
        let options = GridOptions::default().with_slides_per_page(0);
        assert!(build_grid_carousel(&images(2), &options, &NullReporter).is_err());
        let options = GridOptions::default().with_slides_per_page(10);
        assert!(build_grid_carousel(&images(2), &options, &NullReporter).is_err());
    }
}
