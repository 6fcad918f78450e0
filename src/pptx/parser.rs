//! PPTX definition extraction.

use super::xml::{parse_document, XmlElement};
use crate::container::{
    OoxmlContainer, Relationships, REL_TYPE_CHART, REL_TYPE_NOTES_SLIDE, REL_TYPE_SLIDE_LAYOUT,
};
use crate::error::Result;
use crate::events::{BuildEvent, NullReporter, Reporter};
use crate::model::geometry::{emu_to_inches, round4, EMU_PER_INCH};
use crate::model::{
    CellDefinition, ChartSummary, DefinitionMetadata, FontDefinition, GroupChild,
    ParagraphDefinition, PresentationDefinition, RunDefinition, ShapeDefinition, ShapeKind,
    SlideDefinition, TableDefinition,
};
use std::collections::HashMap;
use std::path::Path;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

const GRAPHIC_DATA_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const GRAPHIC_DATA_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const GRAPHIC_DATA_OLE: &str = "http://schemas.openxmlformats.org/presentationml/2006/ole";

/// Slide size used when `p:sldSz` is absent (10in x 7.5in).
const DEFAULT_SLIDE_SIZE: (i64, i64) = (10 * EMU_PER_INCH, 7 * EMU_PER_INCH + EMU_PER_INCH / 2);

/// Options for definition extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Stop after this many slides (`None` or zero: all slides)
    pub max_slides: Option<usize>,
}

impl ExtractOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of slides processed.
    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = Some(max_slides);
        self
    }

    fn limit(&self) -> Option<usize> {
        self.max_slides.filter(|&m| m > 0)
    }
}

/// Slide reference from presentation.xml.
#[derive(Debug, Clone)]
struct SlideRef {
    part: String,
}

/// Shape position in EMUs plus rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Transform {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    rotation: f64,
}

impl Transform {
    fn from_xfrm(xfrm: &XmlElement) -> Self {
        let off = xfrm.child("off");
        let ext = xfrm.child("ext");
        Self {
            x: off.and_then(|o| o.attr_parsed("x")).unwrap_or(0),
            y: off.and_then(|o| o.attr_parsed("y")).unwrap_or(0),
            cx: ext.and_then(|e| e.attr_parsed("cx")).unwrap_or(0),
            cy: ext.and_then(|e| e.attr_parsed("cy")).unwrap_or(0),
            rotation: xfrm
                .attr_parsed::<f64>("rot")
                .map(|r| r / 60_000.0)
                .unwrap_or(0.0),
        }
    }

    fn apply(&self, shape: &mut ShapeDefinition) {
        shape.left_inches = round4(emu_to_inches(self.x));
        shape.top_inches = round4(emu_to_inches(self.y));
        shape.width_inches = round4(emu_to_inches(self.cx));
        shape.height_inches = round4(emu_to_inches(self.cy));
        shape.rotation = self.rotation;
    }
}

/// Placeholder geometry inherited from a slide layout, keyed by `idx`.
type PlaceholderGeometry = HashMap<u32, Transform>;

/// Parser producing a [`PresentationDefinition`] from a PPTX package.
pub struct PptxParser {
    container: OoxmlContainer,
    source_file: String,
    slides: Vec<SlideRef>,
    slide_size: (i64, i64),
}

impl PptxParser {
    /// Open a PPTX file for parsing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let container = OoxmlContainer::open(path)?;
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_container(container, source_file)
    }

    /// Create a parser from bytes; `source_file` names the deck in the output.
    pub fn from_bytes(data: Vec<u8>, source_file: impl Into<String>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container, source_file.into())
    }

    fn from_container(container: OoxmlContainer, source_file: String) -> Result<Self> {
        container.ensure_presentation()?;

        let rels = container.read_relationships(PRESENTATION_PART)?;
        let root = parse_document(&container.read_xml(PRESENTATION_PART)?)?;

        let mut slides = Vec::new();
        if let Some(list) = root.child("sldIdLst") {
            for sld_id in list.children_named("sldId") {
                let Some(rel_id) = sld_id.prefixed_attr("id") else {
                    continue;
                };
                match rels.get(rel_id) {
                    Some(rel) => slides.push(SlideRef {
                        part: OoxmlContainer::resolve_path(PRESENTATION_PART, &rel.target),
                    }),
                    None => tracing::warn!(rel_id, "slide relationship not found"),
                }
            }
        }

        let slide_size = root
            .child("sldSz")
            .and_then(|sz| Some((sz.attr_parsed("cx")?, sz.attr_parsed("cy")?)))
            .unwrap_or(DEFAULT_SLIDE_SIZE);

        Ok(Self {
            container,
            source_file,
            slides,
            slide_size,
        })
    }

    /// Number of slides in the deck.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size in inches (width, height).
    pub fn slide_size_inches(&self) -> (f64, f64) {
        (
            round4(emu_to_inches(self.slide_size.0)),
            round4(emu_to_inches(self.slide_size.1)),
        )
    }

    /// Access the underlying container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Extract the definition of every slide.
    pub fn parse(&self) -> Result<PresentationDefinition> {
        self.parse_with(&ExtractOptions::default(), &NullReporter)
    }

    /// Extract a definition, reporting each processed slide.
    pub fn parse_with(
        &self,
        options: &ExtractOptions,
        reporter: &dyn Reporter,
    ) -> Result<PresentationDefinition> {
        let (width, height) = self.slide_size_inches();
        let mut definition = PresentationDefinition {
            source_file: self.source_file.clone(),
            metadata: DefinitionMetadata {
                slide_width_inches: width,
                slide_height_inches: height,
                slide_count: self.slides.len(),
            },
            slides: Vec::new(),
        };

        let total = self.slides.len();
        reporter.report(&BuildEvent::Started {
            task: "definition",
            total: options.limit().map_or(total, |m| m.min(total)),
        });

        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            if options.limit().is_some_and(|max| number > max) {
                break;
            }

            definition.slides.push(self.parse_slide(number, &slide.part)?);
            reporter.report(&BuildEvent::SlideExtracted {
                slide: number,
                total,
            });
        }

        Ok(definition)
    }

    fn parse_slide(&self, number: usize, part: &str) -> Result<SlideDefinition> {
        let rels = self.container.read_relationships(part)?;
        let root = parse_document(&self.container.read_xml(part)?)?;

        let layout = self.read_layout(part, &rels);
        let (layout_name, inherited) = match &layout {
            Some(layout) => (
                layout.child("cSld").and_then(|c| c.attr("name")).map(String::from),
                layout_placeholders(layout),
            ),
            None => (None, PlaceholderGeometry::new()),
        };

        let mut shapes = Vec::new();
        if let Some(tree) = root.path(&["cSld", "spTree"]) {
            for element in tree.elements() {
                if let Some(shape) = self.parse_shape(element, part, &rels, &inherited) {
                    shapes.push(shape);
                }
            }
        }

        Ok(SlideDefinition {
            index: number,
            layout_name,
            slide_image: None,
            shapes,
            notes: self.read_notes(part, &rels),
        })
    }

    fn read_layout(&self, part: &str, rels: &Relationships) -> Option<XmlElement> {
        let rel = rels.first_of_type(REL_TYPE_SLIDE_LAYOUT)?;
        let layout_part = OoxmlContainer::resolve_path(part, &rel.target);
        let xml = self.container.read_xml(&layout_part).ok()?;
        match parse_document(&xml) {
            Ok(root) => Some(root),
            Err(e) => {
                tracing::warn!(part = %layout_part, "unreadable slide layout: {}", e);
                None
            }
        }
    }

    fn read_notes(&self, part: &str, rels: &Relationships) -> Option<String> {
        let rel = rels.first_of_type(REL_TYPE_NOTES_SLIDE)?;
        let notes_part = OoxmlContainer::resolve_path(part, &rel.target);
        let root = parse_document(&self.container.read_xml(&notes_part).ok()?).ok()?;
        let tree = root.path(&["cSld", "spTree"])?;

        let body = tree
            .children_named("sp")
            .find(|sp| placeholder_type(sp) == Some("body"))?;

        Some(body.child("txBody").map(text_frame_text).unwrap_or_default())
    }

    fn parse_shape(
        &self,
        element: &XmlElement,
        part: &str,
        rels: &Relationships,
        inherited: &PlaceholderGeometry,
    ) -> Option<ShapeDefinition> {
        let mut shape = match element.local_name() {
            "sp" => parse_auto_shape(element),
            "pic" => parse_picture(element),
            "cxnSp" => shape_with_props(element, "nvCxnSpPr", ShapeKind::Line),
            "grpSp" => parse_group(element),
            "graphicFrame" => self.parse_graphic_frame(element, part, rels),
            _ => return None,
        };

        let transform = shape_transform(element).or_else(|| {
            // placeholders without their own xfrm take the layout's position
            let ph = placeholder_element(element)?;
            inherited.get(&ph.attr_parsed("idx").unwrap_or(0)).copied()
        });
        if let Some(transform) = transform {
            transform.apply(&mut shape);
        }

        Some(shape)
    }

    fn parse_graphic_frame(
        &self,
        element: &XmlElement,
        part: &str,
        rels: &Relationships,
    ) -> ShapeDefinition {
        let data = element.path(&["graphic", "graphicData"]);
        let uri = data.and_then(|d| d.attr("uri")).unwrap_or_default();

        match uri {
            GRAPHIC_DATA_TABLE => {
                let mut shape = shape_with_props(element, "nvGraphicFramePr", ShapeKind::Table);
                shape.table = data.and_then(|d| d.child("tbl")).map(parse_table);
                shape
            }
            GRAPHIC_DATA_CHART => {
                let mut shape = shape_with_props(element, "nvGraphicFramePr", ShapeKind::Chart);
                shape.chart = data
                    .and_then(|d| d.child("chart"))
                    .and_then(|c| c.prefixed_attr("id"))
                    .and_then(|id| rels.get(id))
                    .filter(|rel| rel.rel_type == REL_TYPE_CHART)
                    .and_then(|rel| {
                        let chart_part = OoxmlContainer::resolve_path(part, &rel.target);
                        self.read_chart(&chart_part)
                    });
                shape
            }
            GRAPHIC_DATA_OLE => shape_with_props(element, "nvGraphicFramePr", ShapeKind::OleObject),
            _ => shape_with_props(element, "nvGraphicFramePr", ShapeKind::Other),
        }
    }

    fn read_chart(&self, chart_part: &str) -> Option<ChartSummary> {
        let xml = self.container.read_xml(chart_part).ok()?;
        match parse_document(&xml) {
            Ok(root) => summarize_chart(&root),
            Err(e) => {
                tracing::warn!(part = chart_part, "unreadable chart part: {}", e);
                None
            }
        }
    }
}

/// Build a shape from the `cNvPr` inside the given non-visual properties element.
fn shape_with_props(element: &XmlElement, nv_props: &str, kind: ShapeKind) -> ShapeDefinition {
    let c_nv_pr = element.path(&[nv_props, "cNvPr"]);
    let name = c_nv_pr.and_then(|c| c.attr("name")).unwrap_or_default();
    let mut shape = ShapeDefinition::new(name, kind);
    shape.id = c_nv_pr.and_then(|c| c.attr_parsed("id"));
    shape
}

fn placeholder_element(element: &XmlElement) -> Option<&XmlElement> {
    let nv = match element.local_name() {
        "sp" => "nvSpPr",
        "pic" => "nvPicPr",
        "graphicFrame" => "nvGraphicFramePr",
        _ => return None,
    };
    element.path(&[nv, "nvPr", "ph"])
}

fn placeholder_type(element: &XmlElement) -> Option<&str> {
    placeholder_element(element).map(|ph| ph.attr("type").unwrap_or("body"))
}

fn parse_auto_shape(element: &XmlElement) -> ShapeDefinition {
    let is_text_box = element
        .path(&["nvSpPr", "cNvSpPr"])
        .and_then(|c| c.attr("txBox"))
        .is_some_and(|v| v == "1" || v == "true");
    let is_freeform = element.path(&["spPr", "custGeom"]).is_some();

    let kind = if placeholder_element(element).is_some() {
        ShapeKind::Placeholder
    } else if is_text_box {
        ShapeKind::TextBox
    } else if is_freeform {
        ShapeKind::Freeform
    } else {
        ShapeKind::AutoShape
    };

    let mut shape = shape_with_props(element, "nvSpPr", kind);
    let (text, paragraphs) = match element.child("txBody") {
        Some(body) => (text_frame_text(body), parse_paragraphs(body)),
        // an absent body reads as a single empty paragraph
        None => (String::new(), vec![ParagraphDefinition::default()]),
    };
    shape.has_text_frame = true;
    shape.text = Some(text);
    shape.paragraphs = Some(paragraphs);
    shape
}

fn parse_picture(element: &XmlElement) -> ShapeDefinition {
    let nv_pr = element.path(&["nvPicPr", "nvPr"]);
    let is_media = nv_pr.is_some_and(|nv| {
        ["videoFile", "audioFile", "quickTimeFile", "media"]
            .iter()
            .any(|tag| nv.descendant(tag).is_some())
    });

    let kind = if placeholder_element(element).is_some() {
        ShapeKind::Placeholder
    } else if is_media {
        ShapeKind::Media
    } else {
        ShapeKind::Picture
    };
    shape_with_props(element, "nvPicPr", kind)
}

fn parse_group(element: &XmlElement) -> ShapeDefinition {
    let mut shape = shape_with_props(element, "nvGrpSpPr", ShapeKind::Group);

    let children = element
        .elements()
        .filter_map(|child| {
            let (nv, kind) = match child.local_name() {
                "sp" => ("nvSpPr", parse_auto_shape(child).kind),
                "pic" => ("nvPicPr", parse_picture(child).kind),
                "cxnSp" => ("nvCxnSpPr", ShapeKind::Line),
                "grpSp" => ("nvGrpSpPr", ShapeKind::Group),
                "graphicFrame" => ("nvGraphicFramePr", graphic_frame_kind(child)),
                _ => return None,
            };
            let props = shape_with_props(child, nv, kind);
            let transform = shape_transform(child).unwrap_or_default();
            let text = (child.local_name() == "sp").then(|| {
                child
                    .child("txBody")
                    .map(text_frame_text)
                    .unwrap_or_default()
            });

            Some(GroupChild {
                name: props.name,
                kind,
                left_inches: round4(emu_to_inches(transform.x)),
                top_inches: round4(emu_to_inches(transform.y)),
                width_inches: round4(emu_to_inches(transform.cx)),
                height_inches: round4(emu_to_inches(transform.cy)),
                text,
            })
        })
        .collect();

    shape.group_children = Some(children);
    shape
}

fn graphic_frame_kind(element: &XmlElement) -> ShapeKind {
    match element
        .path(&["graphic", "graphicData"])
        .and_then(|d| d.attr("uri"))
    {
        Some(GRAPHIC_DATA_TABLE) => ShapeKind::Table,
        Some(GRAPHIC_DATA_CHART) => ShapeKind::Chart,
        Some(GRAPHIC_DATA_OLE) => ShapeKind::OleObject,
        _ => ShapeKind::Other,
    }
}

/// Position of a shape element, from `spPr`, `grpSpPr` or the frame's own `xfrm`.
fn shape_transform(element: &XmlElement) -> Option<Transform> {
    let xfrm = match element.local_name() {
        "grpSp" => element.path(&["grpSpPr", "xfrm"]),
        "graphicFrame" => element.child("xfrm"),
        _ => element.path(&["spPr", "xfrm"]),
    }?;
    Some(Transform::from_xfrm(xfrm))
}

fn layout_placeholders(layout: &XmlElement) -> PlaceholderGeometry {
    let mut geometry = PlaceholderGeometry::new();
    let Some(tree) = layout.path(&["cSld", "spTree"]) else {
        return geometry;
    };

    for element in tree.elements() {
        if let (Some(ph), Some(transform)) = (placeholder_element(element), shape_transform(element))
        {
            geometry
                .entry(ph.attr_parsed("idx").unwrap_or(0))
                .or_insert(transform);
        }
    }
    geometry
}

fn alignment_name(algn: &str) -> String {
    match algn {
        "l" => "left",
        "ctr" => "center",
        "r" => "right",
        "just" => "justify",
        "dist" => "distributed",
        "justLow" => "justify_low",
        "thaiDist" => "thai_distributed",
        other => other,
    }
    .to_string()
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn parse_font(r_pr: Option<&XmlElement>) -> FontDefinition {
    let Some(r_pr) = r_pr else {
        return FontDefinition::default();
    };

    FontDefinition {
        name: r_pr
            .child("latin")
            .and_then(|l| l.attr("typeface"))
            .map(String::from),
        size_pt: r_pr.attr_parsed::<f64>("sz").map(|sz| sz / 100.0),
        bold: r_pr.attr("b").map(parse_bool),
        italic: r_pr.attr("i").map(parse_bool),
        underline: r_pr.attr("u").map(|u| u != "none"),
        color_hex: r_pr
            .path(&["solidFill", "srgbClr"])
            .and_then(|c| c.attr("val"))
            .map(|val| format!("#{}", val.to_uppercase())),
    }
}

fn parse_paragraphs(body: &XmlElement) -> Vec<ParagraphDefinition> {
    body.children_named("p")
        .map(|p| ParagraphDefinition {
            alignment: p.child("pPr").and_then(|ppr| ppr.attr("algn")).map(alignment_name),
            runs: p
                .children_named("r")
                .map(|r| RunDefinition {
                    text: r.child("t").map(|t| t.text()).unwrap_or_default(),
                    font: parse_font(r.child("rPr")),
                })
                .collect(),
        })
        .collect()
}

/// Text of a paragraph element; line breaks become vertical tabs.
fn paragraph_text(p: &XmlElement) -> String {
    p.elements()
        .filter_map(|e| match e.local_name() {
            "r" | "fld" => e.child("t").map(|t| t.text()),
            "br" => Some('\u{000B}'.to_string()),
            _ => None,
        })
        .collect()
}

/// Text of a frame: paragraphs joined by newlines.
fn text_frame_text(body: &XmlElement) -> String {
    body.children_named("p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_table(tbl: &XmlElement) -> TableDefinition {
    let rows: Vec<Vec<CellDefinition>> = tbl
        .children_named("tr")
        .map(|tr| {
            tr.children_named("tc")
                .map(|tc| CellDefinition {
                    text: tc
                        .child("txBody")
                        .map(text_frame_text)
                        .unwrap_or_default(),
                    row_span: Some(tc.attr_parsed("rowSpan").unwrap_or(1)),
                    col_span: Some(tc.attr_parsed("gridSpan").unwrap_or(1)),
                })
                .collect()
        })
        .collect();

    let column_count = tbl
        .child("tblGrid")
        .map(|grid| grid.children_named("gridCol").count())
        .unwrap_or_else(|| rows.iter().map(Vec::len).max().unwrap_or(0));

    TableDefinition {
        row_count: rows.len(),
        column_count,
        rows,
    }
}

fn summarize_chart(root: &XmlElement) -> Option<ChartSummary> {
    let chart = root.child("chart")?;
    let plot_area = chart.child("plotArea")?;
    let plots: Vec<&XmlElement> = plot_area
        .elements()
        .filter(|e| e.local_name().ends_with("Chart"))
        .collect();
    let first = plots.first()?;

    let categories_count = first
        .child("ser")
        .and_then(|ser| ser.child("cat"))
        .map(|cat| {
            cat.descendant("ptCount")
                .and_then(|count| count.attr_parsed::<usize>("val"))
                .unwrap_or_else(|| cat.descendants("pt").len())
        });

    Some(ChartSummary {
        chart_type: first.local_name().to_string(),
        has_legend: chart.child("legend").is_some(),
        series_count: plots.iter().map(|p| p.children_named("ser").count()).sum(),
        categories_count,
    })
}

/// Extract a definition from a PPTX file with default options.
pub fn extract_definition(path: impl AsRef<Path>) -> Result<PresentationDefinition> {
    PptxParser::open(path)?.parse()
}
