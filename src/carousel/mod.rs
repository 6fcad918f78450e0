//! Template-driven carousel decks.
//!
//! A reference deck shows a few example pages of a horizontally scrolling
//! carousel. [`TemplateLayout`] turns its definition into picture-slot
//! patterns, [`select_pages`] decides for each source slide which pattern
//! and which neighbours a page shows, and a [`PageRenderer`] draws the
//! result.
//!
//! ```no_run
//! use pptx_carousel::carousel::{create_carousel, CarouselOptions};
//! use pptx_carousel::events::TracingReporter;
//!
//! let summary = create_carousel(
//!     "template_definition.json",
//!     "deck_images",
//!     "carousel.pptx",
//!     &CarouselOptions::default(),
//!     &TracingReporter,
//! )?;
//! println!("{} pages", summary.pages);
//! # Ok::<(), pptx_carousel::Error>(())
//! ```

mod builder;
mod images;
mod selector;
mod template;

pub use builder::{
    build_carousel, create_carousel, CarouselOptions, CarouselSummary, PageRenderer, PlacedImage,
    PptxPageRenderer,
};
pub use images::{
    list_slide_images, slide_image_name, wildcard_match, SourceImage, DEFAULT_IMAGE_PATTERN,
};
pub use selector::{
    select_page, select_pages, CarouselPage, PageRule, PictureSlot, Placement, TemplatePattern,
    TemplateSet,
};
pub use template::{EdgePanel, EdgePanels, TemplateLayout};
