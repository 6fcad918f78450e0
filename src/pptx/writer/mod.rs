//! Writing new PPTX packages.
//!
//! [`PresentationWriter`] collects slides in memory and assembles a minimal
//! package on save: one slide master with a blank layout, a theme, the
//! slides and their media.
//!
//! ```no_run
//! use pptx_carousel::model::EmuRect;
//! use pptx_carousel::pptx::{Fill, PresentationWriter, Rgb};
//!
//! let mut deck = PresentationWriter::from_inches(16.0, 9.0);
//! let slide = deck.add_slide();
//! slide.set_background(Rgb::BLACK);
//! slide.add_rectangle(
//!     EmuRect::from_inches(1.0, 1.0, 4.0, 2.0),
//!     Some(Fill::Solid(Rgb::WHITE)),
//!     None,
//!     0.0,
//! );
//! deck.save("out.pptx")?;
//! # Ok::<(), pptx_carousel::Error>(())
//! ```

mod parts;
mod shape;

pub use shape::{Fill, GradientStop, Outline, Rgb, Shape, TextAlign, TextStyle};

use crate::error::{Error, Result};
use crate::model::geometry::inches_to_emu;
use crate::model::{EmuRect, ImageData, ImageFormat};
use parts::*;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// First shape id on a slide; id 1 is the shape tree itself.
const FIRST_SHAPE_ID: u32 = 2;

/// A slide being assembled.
#[derive(Debug, Clone, Default)]
pub struct SlideBuilder {
    background: Option<Rgb>,
    shapes: Vec<Shape>,
    images: Vec<ImageData>,
}

impl SlideBuilder {
    /// Fill the slide background with a solid color.
    pub fn set_background(&mut self, color: Rgb) {
        self.background = Some(color);
    }

    /// Shapes in drawing order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Distinct images embedded in this slide.
    pub fn images(&self) -> &[ImageData] {
        &self.images
    }

    fn image_index(&mut self, image: ImageData) -> usize {
        match self.images.iter().position(|i| i.data == image.data) {
            Some(idx) => idx,
            None => {
                self.images.push(image);
                self.images.len() - 1
            }
        }
    }

    /// Add a picture stretched into `rect`.
    pub fn add_picture(
        &mut self,
        image: ImageData,
        rect: EmuRect,
        outline: Option<Outline>,
        description: impl Into<String>,
    ) {
        let image = self.image_index(image);
        self.shapes.push(Shape::Picture {
            rect,
            image,
            outline,
            description: description.into(),
        });
    }

    /// Read an image file and add it as a picture.
    ///
    /// Fails with [`Error::ImageFormat`] when the file is not a PNG, JPEG,
    /// GIF or BMP image.
    pub fn add_picture_file(
        &mut self,
        path: impl AsRef<Path>,
        rect: EmuRect,
        outline: Option<Outline>,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let image = ImageData::from_bytes(data).ok_or_else(|| {
            Error::ImageFormat(format!("unrecognized image data in {}", path.display()))
        })?;
        let description = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add_picture(image, rect, outline, description);
        Ok(())
    }

    /// Add a rectangle.
    pub fn add_rectangle(
        &mut self,
        rect: EmuRect,
        fill: Option<Fill>,
        outline: Option<Outline>,
        rotation: f64,
    ) {
        self.shapes.push(Shape::Rectangle {
            rect,
            fill,
            outline,
            rotation,
        });
    }

    /// Add a single-run text box.
    pub fn add_text_box(
        &mut self,
        rect: EmuRect,
        text: impl Into<String>,
        style: TextStyle,
        fill: Option<Rgb>,
    ) {
        self.shapes.push(Shape::TextBox {
            rect,
            text: text.into(),
            style,
            fill,
        });
    }

    fn to_xml(&self, media_names: &[String]) -> Result<(String, String)> {
        let mut xml = String::with_capacity(4096);
        write!(xml, "{}<p:sld {}><p:cSld>", XML_HEADER, NS_DECL)?;
        if let Some(bg) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                bg.hex()
            )?;
        }
        write!(xml, "<p:spTree>{}", GROUP_HEADER)?;

        for (offset, shape) in self.shapes.iter().enumerate() {
            let id = FIRST_SHAPE_ID + offset as u32;
            let rel_id = match shape {
                Shape::Picture { image, .. } => Some(format!("rId{}", image + 2)),
                _ => None,
            };
            shape.write_xml(&mut xml, id, rel_id.as_deref())?;
        }
        xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");

        let mut rels = String::with_capacity(512);
        write!(rels, r#"{}<Relationships xmlns="{}">"#, XML_HEADER, REL_NS)?;
        rels.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#);
        for (idx, name) in media_names.iter().enumerate() {
            write!(
                rels,
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
                idx + 2,
                name
            )?;
        }
        rels.push_str("</Relationships>");

        Ok((xml, rels))
    }
}

/// An in-memory presentation written as a PPTX package.
#[derive(Debug, Clone)]
pub struct PresentationWriter {
    width_emu: i64,
    height_emu: i64,
    slides: Vec<SlideBuilder>,
}

impl PresentationWriter {
    /// Create an empty presentation with the given slide size in EMUs.
    pub fn new(width_emu: i64, height_emu: i64) -> Self {
        Self {
            width_emu,
            height_emu,
            slides: Vec::new(),
        }
    }

    /// Create an empty presentation with the given slide size in inches.
    pub fn from_inches(width: f64, height: f64) -> Self {
        Self::new(inches_to_emu(width), inches_to_emu(height))
    }

    /// Slide size in EMUs (width, height).
    pub fn slide_size(&self) -> (i64, i64) {
        (self.width_emu, self.height_emu)
    }

    /// Append a blank slide and return it for editing.
    pub fn add_slide(&mut self) -> &mut SlideBuilder {
        self.slides.push(SlideBuilder::default());
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[SlideBuilder] {
        &self.slides
    }

    fn content_types(&self) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        write!(
            xml,
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            XML_HEADER
        )?;
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        let mut formats: Vec<ImageFormat> = Vec::new();
        for image in self.slides.iter().flat_map(|s| s.images.iter()) {
            if !formats.contains(&image.format) {
                formats.push(image.format);
            }
        }
        for format in formats {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            )?;
        }
        xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
        xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
        xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
        xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
        for n in 1..=self.slides.len() {
            write!(
                xml,
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                n
            )?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }

    fn presentation_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        write!(xml, "{}<p:presentation {} saveSubsetFonts=\"1\">", XML_HEADER, NS_DECL)?;
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for n in 0..self.slides.len() {
                write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, n + 3)?;
            }
            xml.push_str("</p:sldIdLst>");
        }
        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            self.width_emu, self.height_emu
        )?;
        Ok(xml)
    }

    fn presentation_rels(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        write!(xml, r#"{}<Relationships xmlns="{}">"#, XML_HEADER, REL_NS)?;
        xml.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#);
        xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#);
        for n in 1..=self.slides.len() {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                n + 2,
                n
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }

    /// Assemble the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        let mut put = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)?;
            zip.write_all(data)?;
            Ok(())
        };

        put("[Content_Types].xml", self.content_types()?.as_bytes())?;
        put("_rels/.rels", PACKAGE_RELS.as_bytes())?;
        put("ppt/presentation.xml", self.presentation_xml()?.as_bytes())?;
        put(
            "ppt/_rels/presentation.xml.rels",
            self.presentation_rels()?.as_bytes(),
        )?;
        put(
            "ppt/slideMasters/slideMaster1.xml",
            slide_master_xml().as_bytes(),
        )?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS.as_bytes(),
        )?;
        put(
            "ppt/slideLayouts/slideLayout1.xml",
            slide_layout_xml().as_bytes(),
        )?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS.as_bytes(),
        )?;
        put("ppt/theme/theme1.xml", THEME.as_bytes())?;

        let mut media_count = 0usize;
        for (idx, slide) in self.slides.iter().enumerate() {
            let mut names = Vec::with_capacity(slide.images.len());
            for image in &slide.images {
                media_count += 1;
                let name = format!("image{}.{}", media_count, image.format.extension());
                put(&format!("ppt/media/{}", name), &image.data)?;
                names.push(name);
            }

            let (xml, rels) = slide.to_xml(&names)?;
            put(&format!("ppt/slides/slide{}.xml", idx + 1), xml.as_bytes())?;
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", idx + 1),
                rels.as_bytes(),
            )?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        tracing::debug!(path = %path.display(), slides = self.slides.len(), "wrote presentation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::OoxmlContainer;
    use crate::pptx::PptxParser;

    fn png() -> ImageData {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0u8; 16]);
        ImageData::from_bytes(data).unwrap()
    }

    #[test]
    fn test_package_parts() {
        let mut deck = PresentationWriter::from_inches(16.0, 9.0);
        deck.add_slide().set_background(Rgb::BLACK);
        deck.add_slide();

        let container = OoxmlContainer::from_bytes(deck.to_bytes().unwrap()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
        ] {
            assert!(container.exists(part), "missing {}", part);
        }
        let slide = container.read_xml("ppt/slides/slide1.xml").unwrap();
        assert!(slide.contains(r#"<a:srgbClr val="000000"/>"#));
    }

    #[test]
    fn test_same_image_shares_media_within_slide() {
        let mut deck = PresentationWriter::from_inches(10.0, 7.5);
        let slide = deck.add_slide();
        slide.add_picture(png(), EmuRect::new(0, 0, 10, 10), None, "a.png");
        slide.add_picture(png(), EmuRect::new(20, 0, 10, 10), None, "a.png");
        assert_eq!(slide.images().len(), 1);
        assert_eq!(slide.images()[0].format, ImageFormat::Png);

        let container = OoxmlContainer::from_bytes(deck.to_bytes().unwrap()).unwrap();
        assert_eq!(container.list_files_with_prefix("ppt/media/").len(), 1);
        let types = container.read_xml("[Content_Types].xml").unwrap();
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        let rels = container
            .read_relationships("ppt/slides/slide1.xml")
            .unwrap();
        assert_eq!(rels.get("rId2").unwrap().target, "../media/image1.png");
    }

    #[test]
    fn test_written_deck_parses_back() {
        let mut deck = PresentationWriter::from_inches(16.0, 9.0);
        let slide = deck.add_slide();
        slide.add_picture(
            png(),
            EmuRect::from_inches(1.0, 2.0, 4.0, 2.25),
            Some(Outline::new(Rgb::new(200, 200, 200), 1.0)),
            "slide_001.png",
        );
        slide.add_text_box(
            EmuRect::from_inches(0.0, 0.0, 16.0, 1.0),
            "Slides 1 - 4",
            TextStyle::new(32.0).bold(true),
            None,
        );

        let parser = PptxParser::from_bytes(deck.to_bytes().unwrap(), "deck.pptx").unwrap();
        assert_eq!(parser.slide_count(), 1);
        assert_eq!(parser.slide_size_inches(), (16.0, 9.0));

        let definition = parser.parse().unwrap();
        let slide = &definition.slides[0];
        assert_eq!(slide.layout_name.as_deref(), Some("Blank"));
        let picture = slide.pictures().next().unwrap();
        assert_eq!(picture.left_inches, 1.0);
        assert_eq!(picture.height_inches, 2.25);
        assert_eq!(slide.shapes[1].text.as_deref(), Some("Slides 1 - 4"));
    }

    #[test]
    fn test_missing_picture_file() {
        let mut deck = PresentationWriter::from_inches(10.0, 7.5);
        let err = deck
            .add_slide()
            .add_picture_file("/nonexistent/slide_001.png", EmuRect::default(), None)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
