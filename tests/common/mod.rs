//! Synthetic PPTX packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_NOTES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

/// One slide of a synthetic deck.
#[derive(Default, Clone)]
pub struct TestSlide {
    pub shapes: Vec<String>,
    pub notes: Option<String>,
    pub clr_map_ovr: bool,
    pub transition: bool,
    /// Replaces the generated slide part entirely
    pub raw: Option<String>,
}

impl TestSlide {
    pub fn new() -> Self {
        Self {
            clr_map_ovr: true,
            ..Default::default()
        }
    }

    pub fn shape(mut self, xml: String) -> Self {
        self.shapes.push(xml);
        self
    }

    pub fn notes(mut self, text: &str) -> Self {
        self.notes = Some(text.to_string());
        self
    }

    pub fn with_transition(mut self) -> Self {
        self.transition = true;
        self
    }

    pub fn raw(xml: &str) -> Self {
        Self {
            raw: Some(xml.to_string()),
            ..Default::default()
        }
    }

    pub fn without_clr_map_ovr(mut self) -> Self {
        self.clr_map_ovr = false;
        self
    }

    fn xml(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#
        );
        for shape in &self.shapes {
            xml.push_str(shape);
        }
        xml.push_str("</p:spTree></p:cSld>");
        if self.clr_map_ovr {
            xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        }
        if self.transition {
            xml.push_str(r#"<p:transition spd="fast"><p:fade/></p:transition>"#);
        }
        xml.push_str("</p:sld>");
        xml
    }
}

fn off_ext(inches: (f64, f64, f64, f64)) -> String {
    let emu = |v: f64| (v * 914_400.0).round() as i64;
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(inches.0),
        emu(inches.1),
        emu(inches.2),
        emu(inches.3)
    )
}

/// A picture shape at the given position in inches.
pub fn picture(id: u32, name: &str, rect: (f64, f64, f64, f64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"/></p:spPr></p:pic>"#,
        off_ext(rect)
    )
}

/// A plain rectangle auto shape.
pub fn rectangle(id: u32, name: &str, rect: (f64, f64, f64, f64)) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"/></p:spPr></p:sp>"#,
        off_ext(rect)
    )
}

/// A title placeholder without its own transform.
pub fn title_placeholder(id: u32, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title {id}"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="4400" b="1"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

fn layout_xml(name: &str) -> String {
    let title = off_ext((0.5, 0.25, 9.0, 1.25));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS}><p:cSld name="{name}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr>{title}</p:spPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#
    )
}

fn notes_xml(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#
    )
}

/// Build a PPTX package with one "Title Only" layout shared by all slides.
pub fn build_deck(slides: &[TestSlide], size_inches: (f64, f64)) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        );
        put(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
        );

        let mut ids = String::new();
        let mut rels = String::new();
        for n in 1..=slides.len() {
            ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{REL_SLIDE}" Target="slides/slide{}.xml"/>"#,
                n + 1,
                n
            ));
        }
        put(
            "ppt/presentation.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/></p:presentation>"#,
                (size_inches.0 * 914_400.0).round() as i64,
                (size_inches.1 * 914_400.0).round() as i64
            ),
        );
        put(
            "ppt/_rels/presentation.xml.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            ),
        );
        put("ppt/slideLayouts/slideLayout1.xml", &layout_xml("Title Only"));

        for (idx, slide) in slides.iter().enumerate() {
            let n = idx + 1;
            put(&format!("ppt/slides/slide{}.xml", n), &slide.xml());

            let mut slide_rels = format!(
                r#"<Relationship Id="rId1" Type="{REL_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>"#
            );
            if let Some(text) = &slide.notes {
                slide_rels.push_str(&format!(
                    r#"<Relationship Id="rId2" Type="{REL_NOTES}" Target="../notesSlides/notesSlide{n}.xml"/>"#
                ));
                put(&format!("ppt/notesSlides/notesSlide{}.xml", n), &notes_xml(text));
            }
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                &format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{slide_rels}</Relationships>"#
                ),
            );
        }

        zip.finish().unwrap();
    }
    buffer
}

/// Read one entry of a ZIP package as text.
pub fn read_entry(data: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

/// Names of all entries of a ZIP package, in archive order.
pub fn entry_names(data: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(data)).unwrap();
    archive.file_names().map(String::from).collect()
}
