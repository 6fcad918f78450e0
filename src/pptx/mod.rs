//! PPTX (PowerPoint) packages: reading definitions, writing decks and
//! rewriting slide transitions.

mod parser;
mod transitions;
mod writer;
pub mod xml;

pub use parser::{extract_definition, ExtractOptions, PptxParser};
pub use transitions::{
    add_morph_transitions, add_morph_transitions_to_bytes, apply_morph_to_slide_xml, MorphOption,
    MorphOptions, TransitionSpeed,
};
pub use writer::{
    Fill, GradientStop, Outline, PresentationWriter, Rgb, Shape, SlideBuilder, TextAlign,
    TextStyle,
};
