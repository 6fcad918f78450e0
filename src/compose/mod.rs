//! Decks assembled directly from exported slide images.
//!
//! - [`grid`]: overview pages with several thumbnails each
//! - [`rebuild`]: one full-bleed image per slide of a definition

pub mod grid;
pub mod rebuild;

pub use grid::{build_grid_carousel, create_grid_carousel, GridOptions};
pub use rebuild::{build_from_definition, rebuild_presentation, RebuildOptions};
