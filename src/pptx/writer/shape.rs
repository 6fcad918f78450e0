//! Shapes placed on generated slides and their DrawingML.

use crate::error::Result;
use crate::model::EmuRect;
use crate::model::geometry::points_to_emu;
use std::fmt::Write as FmtWrite;

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Angle in DrawingML units (60000ths of a degree).
fn angle_units(degrees: f64) -> i64 {
    (degrees * 60_000.0).round() as i64
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase hex without `#`, as `a:srgbClr@val` wants it.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One stop of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, 0.0 to 1.0
    pub position: f64,
    pub color: Rgb,
    /// Opacity, 0.0 (transparent) to 1.0
    pub alpha: f64,
}

impl GradientStop {
    pub fn new(position: f64, color: Rgb, alpha: f64) -> Self {
        Self {
            position,
            color,
            alpha,
        }
    }
}

/// Shape fill.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    /// Two-stop linear gradient; `angle` in degrees
    Gradient { angle: f64, stops: [GradientStop; 2] },
}

impl Fill {
    fn write_xml(&self, xml: &mut String) -> Result<()> {
        match self {
            Fill::Solid(color) => {
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.hex())?;
            }
            Fill::Gradient { angle, stops } => {
                xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst>"#);
                for stop in stops {
                    write!(
                        xml,
                        r#"<a:gs pos="{}"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:gs>"#,
                        (stop.position.clamp(0.0, 1.0) * 100_000.0).round() as i64,
                        stop.color.hex(),
                        (stop.alpha.clamp(0.0, 1.0) * 100_000.0).round() as i64,
                    )?;
                }
                write!(
                    xml,
                    r#"</a:gsLst><a:lin ang="{}" scaled="0"/></a:gradFill>"#,
                    angle_units(*angle)
                )?;
            }
        }
        Ok(())
    }
}

/// Shape outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub color: Rgb,
    pub width_pt: f64,
}

impl Outline {
    pub fn new(color: Rgb, width_pt: f64) -> Self {
        Self { color, width_pt }
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
            points_to_emu(self.width_pt),
            self.color.hex()
        )?;
        Ok(())
    }
}

fn write_outline(xml: &mut String, outline: Option<&Outline>) -> Result<()> {
    match outline {
        Some(outline) => outline.write_xml(xml),
        None => {
            xml.push_str("<a:ln><a:noFill/></a:ln>");
            Ok(())
        }
    }
}

/// Paragraph alignment for text boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn to_xml_value(self) -> &'static str {
        match self {
            TextAlign::Left => "l",
            TextAlign::Center => "ctr",
            TextAlign::Right => "r",
        }
    }
}

/// Formatting of a text box's single run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_pt: f64,
    pub bold: bool,
    pub color: Rgb,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size_pt: 18.0,
            bold: false,
            color: Rgb::BLACK,
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    pub fn new(size_pt: f64) -> Self {
        Self {
            size_pt,
            ..Self::default()
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// A shape on a generated slide.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Picture {
        rect: EmuRect,
        /// Index into the slide's image list
        image: usize,
        outline: Option<Outline>,
        description: String,
    },
    Rectangle {
        rect: EmuRect,
        fill: Option<Fill>,
        outline: Option<Outline>,
        /// Clockwise rotation in degrees
        rotation: f64,
    },
    TextBox {
        rect: EmuRect,
        text: String,
        style: TextStyle,
        fill: Option<Rgb>,
    },
}

fn write_xfrm(xml: &mut String, rect: &EmuRect, rotation: f64) -> Result<()> {
    let rot = angle_units(rotation);
    if rot != 0 {
        write!(xml, r#"<a:xfrm rot="{}">"#, rot)?;
    } else {
        xml.push_str("<a:xfrm>");
    }
    write!(
        xml,
        r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    Ok(())
}

impl Shape {
    /// Append this shape's XML. `rel_id` is the image relationship for pictures.
    pub(crate) fn write_xml(&self, xml: &mut String, id: u32, rel_id: Option<&str>) -> Result<()> {
        match self {
            Shape::Picture {
                rect,
                outline,
                description,
                ..
            } => {
                write!(
                    xml,
                    r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                    escape_xml(description),
                )?;
                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                    rel_id.unwrap_or_default()
                )?;
                xml.push_str("<p:spPr>");
                write_xfrm(xml, rect, 0.0)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                if let Some(outline) = outline {
                    outline.write_xml(xml)?;
                }
                xml.push_str("</p:spPr></p:pic>");
            }
            Shape::Rectangle {
                rect,
                fill,
                outline,
                rotation,
            } => {
                write!(
                    xml,
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Rectangle {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#
                )?;
                write_xfrm(xml, rect, *rotation)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                match fill {
                    Some(fill) => fill.write_xml(xml)?,
                    None => xml.push_str("<a:noFill/>"),
                }
                write_outline(xml, outline.as_ref())?;
                xml.push_str("</p:spPr></p:sp>");
            }
            Shape::TextBox {
                rect,
                text,
                style,
                fill,
            } => {
                write!(
                    xml,
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#
                )?;
                write_xfrm(xml, rect, 0.0)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                match fill {
                    Some(color) => Fill::Solid(*color).write_xml(xml)?,
                    None => xml.push_str("<a:noFill/>"),
                }
                xml.push_str("</p:spPr>");

                xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="ctr"/><a:lstStyle/>"#);
                write!(xml, r#"<a:p><a:pPr algn="{}"/>"#, style.align.to_xml_value())?;
                write!(
                    xml,
                    r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0">"#,
                    (style.size_pt * 100.0).round() as i64,
                    if style.bold { 1 } else { 0 }
                )?;
                write!(
                    xml,
                    r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
                    style.color.hex(),
                    escape_xml(text)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::new(200, 200, 200).hex(), "C8C8C8");
        assert_eq!(Rgb::new(50, 50, 150).hex(), "323296");
    }

    #[test]
    fn test_gradient_fill_xml() {
        let fill = Fill::Gradient {
            angle: 180.0,
            stops: [
                GradientStop::new(0.0, Rgb::BLACK, 0.0),
                GradientStop::new(1.0, Rgb::BLACK, 1.0),
            ],
        };
        let mut xml = String::new();
        fill.write_xml(&mut xml).unwrap();
        assert!(xml.contains(r#"<a:gs pos="0"><a:srgbClr val="000000"><a:alpha val="0"/>"#));
        assert!(xml.contains(r#"<a:gs pos="100000"><a:srgbClr val="000000"><a:alpha val="100000"/>"#));
        assert!(xml.contains(r#"<a:lin ang="10800000" scaled="0"/>"#));
    }

    #[test]
    fn test_picture_outline_xml() {
        let shape = Shape::Picture {
            rect: EmuRect::new(0, 0, 914400, 914400),
            image: 0,
            outline: Some(Outline::new(Rgb::new(200, 200, 200), 1.0)),
            description: "slide_001.png".to_string(),
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 4, Some("rId2")).unwrap();
        assert!(xml.contains(r#"<p:cNvPr id="4" name="Picture 4" descr="slide_001.png"/>"#));
        assert!(xml.contains(r#"r:embed="rId2""#));
        assert!(xml.contains(r#"<a:ln w="12700"><a:solidFill><a:srgbClr val="C8C8C8"/>"#));
    }

    #[test]
    fn test_rotated_rectangle_without_outline() {
        let shape = Shape::Rectangle {
            rect: EmuRect::new(1, 2, 3, 4),
            fill: Some(Fill::Solid(Rgb::BLACK)),
            outline: None,
            rotation: 90.0,
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 2, None).unwrap();
        assert!(xml.contains(r#"<a:xfrm rot="5400000">"#));
        assert!(xml.contains("<a:ln><a:noFill/></a:ln>"));
    }

    #[test]
    fn test_text_box_escapes() {
        let shape = Shape::TextBox {
            rect: EmuRect::default(),
            text: "Slides 1 & 2".to_string(),
            style: TextStyle::new(32.0).bold(true).align(TextAlign::Center),
            fill: None,
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 3, None).unwrap();
        assert!(xml.contains("<a:t>Slides 1 &amp; 2</a:t>"));
        assert!(xml.contains(r#"sz="3200" b="1""#));
        assert!(xml.contains(r#"<a:pPr algn="ctr"/>"#));
    }
}
