//! Data model shared by the extractor, the template loader and the writers.
//!
//! Definitions describe existing decks; image media and geometry helpers are
//! used when new decks are written.

mod definition;
pub mod geometry;
mod resource;

pub use definition::*;
pub use geometry::EmuRect;
pub use resource::*;
