//! Definition extraction from synthetic decks.

mod common;

use common::{build_deck, picture, rectangle, title_placeholder, TestSlide};
use pptx_carousel::render::{load_definition, save_definition};
use pptx_carousel::{
    extract_definition, extract_definition_from_bytes, DefinitionFormat, ExtractOptions,
    NullReporter, PptxParser, ShapeKind,
};
use tempfile::TempDir;

fn sample_deck() -> Vec<u8> {
    build_deck(
        &[
            TestSlide::new()
                .shape(title_placeholder(2, "Roadmap"))
                .shape(picture(3, "Picture 3", (1.0, 2.0, 4.0, 2.25)))
                .notes("Mention the launch date"),
            TestSlide::new().shape(rectangle(2, "Panel", (0.0, 0.0, 2.0, 7.5))),
            TestSlide::new(),
        ],
        (13.3333, 7.5),
    )
}

#[test]
fn extracts_metadata_and_slides() {
    let definition = extract_definition_from_bytes(sample_deck(), "Roadmap.pptx").unwrap();

    assert_eq!(definition.source_file, "Roadmap.pptx");
    assert_eq!(definition.metadata.slide_width_inches, 13.3333);
    assert_eq!(definition.metadata.slide_height_inches, 7.5);
    assert_eq!(definition.metadata.slide_count, 3);

    let indices: Vec<usize> = definition.slides.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(definition
        .slides
        .iter()
        .all(|s| s.layout_name.as_deref() == Some("Title Only")));
    assert!(definition.slides.iter().all(|s| s.slide_image.is_none()));
}

#[test]
fn placeholder_inherits_layout_geometry() {
    let definition = extract_definition_from_bytes(sample_deck(), "Roadmap.pptx").unwrap();
    let title = &definition.slides[0].shapes[0];

    assert_eq!(title.kind, ShapeKind::Placeholder);
    assert_eq!(
        (
            title.left_inches,
            title.top_inches,
            title.width_inches,
            title.height_inches
        ),
        (0.5, 0.25, 9.0, 1.25)
    );
    assert!(title.has_text_frame);
    assert_eq!(title.text.as_deref(), Some("Roadmap"));

    let paragraphs = title.paragraphs.as_ref().unwrap();
    assert_eq!(paragraphs[0].alignment.as_deref(), Some("center"));
    assert_eq!(paragraphs[0].runs[0].font.size_pt, Some(44.0));
    assert_eq!(paragraphs[0].runs[0].font.bold, Some(true));
}

#[test]
fn pictures_and_notes() {
    let definition = extract_definition_from_bytes(sample_deck(), "Roadmap.pptx").unwrap();
    let first = &definition.slides[0];

    let pictures: Vec<_> = first.pictures().collect();
    assert_eq!(pictures.len(), 1);
    assert_eq!(pictures[0].name, "Picture 3");
    assert_eq!(pictures[0].id, Some(3));
    assert_eq!(pictures[0].left_inches, 1.0);
    assert_eq!(pictures[0].width_inches, 4.0);

    assert_eq!(first.notes.as_deref(), Some("Mention the launch date"));
    assert_eq!(definition.slides[1].notes, None);
    assert_eq!(definition.slides[1].shapes[0].kind, ShapeKind::AutoShape);
    assert!(definition.slides[2].shapes.is_empty());
}

#[test]
fn notes_follow_their_own_slide() {
    let deck = build_deck(
        &[
            TestSlide::new(),
            TestSlide::new().notes("Second slide talking points"),
            TestSlide::new().notes("Closing remarks"),
        ],
        (10.0, 7.5),
    );
    let definition = extract_definition_from_bytes(deck, "Notes.pptx").unwrap();

    let notes: Vec<Option<&str>> = definition.slides.iter().map(|s| s.notes.as_deref()).collect();
    assert_eq!(
        notes,
        vec![None, Some("Second slide talking points"), Some("Closing remarks")]
    );
}

#[test]
fn max_slides_limits_extraction() {
    let parser = PptxParser::from_bytes(sample_deck(), "Roadmap.pptx").unwrap();
    let definition = parser
        .parse_with(&ExtractOptions::new().with_max_slides(2), &NullReporter)
        .unwrap();

    assert_eq!(definition.slides.len(), 2);
    // the metadata still describes the whole deck
    assert_eq!(definition.metadata.slide_count, 3);
}

#[test]
fn definition_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let deck = dir.path().join("Roadmap.pptx");
    std::fs::write(&deck, sample_deck()).unwrap();

    let definition = extract_definition(&deck).unwrap();
    let json = dir.path().join("Roadmap_definition.json");
    save_definition(&definition, &json, DefinitionFormat::Json).unwrap();
    assert_eq!(load_definition(&json).unwrap(), definition);

    let text = std::fs::read_to_string(&json).unwrap();
    assert!(text.contains("\"type\": \"placeholder\""));
    assert!(text.contains("\"is_picture\": true"));
}

#[test]
fn rejects_non_presentation_packages() {
    let mut buffer = Vec::new();
    {
        use std::io::Write;
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        zip.finish().unwrap();
    }

    assert!(extract_definition_from_bytes(buffer, "letter.docx").is_err());
    assert!(extract_definition_from_bytes(b"not a zip".to_vec(), "x.pptx").is_err());
}
