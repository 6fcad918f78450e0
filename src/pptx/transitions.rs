//! Morph slide transitions.
//!
//! Morph is a PowerPoint 2016 transition (`p159:morph`). It is written inside
//! an `mc:AlternateContent` block whose fallback is a plain fade, so older
//! readers still open the deck.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const NAMESPACES: [(&str, &str); 3] = [
    (
        "xmlns:mc",
        "http://schemas.openxmlformats.org/markup-compatibility/2006",
    ),
    (
        "xmlns:p14",
        "http://schemas.microsoft.com/office/powerpoint/2010/main",
    ),
    (
        "xmlns:p159",
        "http://schemas.microsoft.com/office/powerpoint/2015/09/main",
    ),
];

/// Transition speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionSpeed {
    #[default]
    Slow,
    Medium,
    Fast,
}

impl TransitionSpeed {
    /// Convert to OOXML speed value.
    pub fn to_xml_value(self) -> &'static str {
        match self {
            TransitionSpeed::Slow => "slow",
            TransitionSpeed::Medium => "med",
            TransitionSpeed::Fast => "fast",
        }
    }
}

impl std::str::FromStr for TransitionSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(TransitionSpeed::Slow),
            "med" | "medium" => Ok(TransitionSpeed::Medium),
            "fast" => Ok(TransitionSpeed::Fast),
            other => Err(Error::InvalidInput(format!(
                "unknown transition speed: {}",
                other
            ))),
        }
    }
}

/// What Morph matches between consecutive slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MorphOption {
    #[default]
    ByObject,
    ByWord,
    ByChar,
}

impl MorphOption {
    /// Convert to the `option` attribute value.
    pub fn to_xml_value(self) -> &'static str {
        match self {
            MorphOption::ByObject => "byObject",
            MorphOption::ByWord => "byWord",
            MorphOption::ByChar => "byChar",
        }
    }
}

impl std::str::FromStr for MorphOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "object" | "byobject" => Ok(MorphOption::ByObject),
            "word" | "byword" => Ok(MorphOption::ByWord),
            "char" | "bychar" => Ok(MorphOption::ByChar),
            other => Err(Error::InvalidInput(format!("unknown morph option: {}", other))),
        }
    }
}

/// Options for [`add_morph_transitions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphOptions {
    pub speed: TransitionSpeed,
    /// Transition duration in milliseconds
    pub duration_ms: u32,
    pub option: MorphOption,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            speed: TransitionSpeed::Slow,
            duration_ms: 2000,
            option: MorphOption::ByObject,
        }
    }
}

impl MorphOptions {
    /// Create default options (slow, 2000 ms, by object).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, speed: TransitionSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_option(mut self, option: MorphOption) -> Self {
        self.option = option;
        self
    }

    /// The `mc:AlternateContent` block inserted into each slide.
    pub fn transition_xml(&self) -> String {
        let speed = self.speed.to_xml_value();
        format!(
            concat!(
                r#"<mc:AlternateContent>"#,
                r#"<mc:Choice Requires="p159"><p:transition spd="{speed}" p14:dur="{dur}"><p159:morph option="{option}"/></p:transition></mc:Choice>"#,
                r#"<mc:Fallback><p:transition spd="{speed}"><p:fade/></p:transition></mc:Fallback>"#,
                r#"</mc:AlternateContent>"#,
            ),
            speed = speed,
            dur = self.duration_ms,
            option = self.option.to_xml_value(),
        )
    }
}

fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().rposition(|&b| b == b':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

fn with_namespaces(root: &BytesStart<'_>) -> BytesStart<'static> {
    let mut root = root.to_owned().into_owned();
    for (key, uri) in NAMESPACES {
        let declared = root
            .attributes()
            .flatten()
            .any(|a| a.key.as_ref() == key.as_bytes());
        if !declared {
            root.push_attribute((key, uri));
        }
    }
    root
}

fn contains_transition(inner: &str) -> bool {
    inner.contains(":transition") || inner.contains("<transition")
}

/// Rewrite one slide part: drop existing transitions and insert a Morph
/// transition after `p:clrMapOvr`, or after `p:cSld` when there is none.
pub fn apply_morph_to_slide_xml(xml: &str, options: &MorphOptions) -> Result<String> {
    let block = options.transition_xml();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + block.len() + 256));

    let mut depth = 0usize;
    let mut inserted = false;
    // output offset just past the root-level p:cSld
    let mut after_csld: Option<usize> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                if depth == 0 {
                    writer.write_event(Event::Start(with_namespaces(&e)))?;
                } else if depth == 1 && local_name(e.name().as_ref()) == b"transition" {
                    let end = e.to_end().into_owned();
                    reader.read_to_end(end.name())?;
                    continue;
                } else if depth == 1 && local_name(e.name().as_ref()) == b"AlternateContent" {
                    let end = e.to_end().into_owned();
                    let span = reader.read_to_end(end.name())?;
                    let inner = xml
                        .get(span.start as usize..span.end as usize)
                        .ok_or_else(|| Error::XmlParse("bad AlternateContent span".to_string()))?;
                    if !contains_transition(inner) {
                        writer.write_event(Event::Start(e))?;
                        writer.get_mut().write_all(inner.as_bytes())?;
                        writer.write_event(Event::End(end))?;
                    }
                    continue;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref()).to_vec();
                if depth == 0 {
                    return Err(Error::InvalidData("slide part has an empty root".to_string()));
                }
                if depth == 1 && local == b"transition" {
                    continue;
                }
                writer.write_event(Event::Empty(e))?;
                if depth == 1 && local == b"clrMapOvr" && !inserted {
                    writer.get_mut().write_all(block.as_bytes())?;
                    inserted = true;
                } else if depth == 1 && local == b"cSld" {
                    after_csld = Some(writer.get_ref().len());
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let local = local_name(e.name().as_ref()).to_vec();
                writer.write_event(Event::End(e))?;
                if depth == 1 && local == b"clrMapOvr" && !inserted {
                    writer.get_mut().write_all(block.as_bytes())?;
                    inserted = true;
                } else if depth == 1 && local == b"cSld" {
                    after_csld = Some(writer.get_ref().len());
                }
            }
            other => writer.write_event(other)?,
        }
    }

    let mut out = writer.into_inner();
    if !inserted {
        let at = after_csld.ok_or_else(|| {
            Error::InvalidData("slide part has no p:cSld element".to_string())
        })?;
        out.splice(at..at, block.bytes());
    }

    String::from_utf8(out)
        .map_err(|e| Error::InvalidData(format!("rewritten slide is not UTF-8: {}", e)))
}

/// Slide number of a `ppt/slides/slideN.xml` entry.
fn slide_number(name: &str) -> Option<usize> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Add Morph transitions to every slide of an in-memory package.
///
/// Returns the new package and the number of slides that received a
/// transition. Slides that fail to rewrite are reported and kept as they
/// were.
pub fn add_morph_transitions_to_bytes(
    data: Vec<u8>,
    options: &MorphOptions,
    reporter: &dyn Reporter,
) -> Result<(Vec<u8>, usize)> {
    let container = OoxmlContainer::from_bytes(data)?;
    container.ensure_presentation()?;

    let names = container.list_files();
    let mut slides: Vec<(usize, &str)> = names
        .iter()
        .filter_map(|n| slide_number(n).map(|num| (num, n.as_str())))
        .collect();
    slides.sort_by_key(|(num, _)| *num);
    let total = slides.len();

    reporter.report(&BuildEvent::Started {
        task: "morph",
        total,
    });

    let mut rewritten = std::collections::HashMap::new();
    for &(number, name) in &slides {
        let result = container
            .read_xml(name)
            .and_then(|xml| apply_morph_to_slide_xml(&xml, options));
        match result {
            Ok(xml) => {
                rewritten.insert(name, xml);
                reporter.report(&BuildEvent::TransitionApplied {
                    slide: number,
                    total,
                });
            }
            Err(e) => reporter.report(&BuildEvent::SlideSkipped {
                slide: number,
                reason: e.to_string(),
            }),
        }
    }

    let file_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for name in &names {
        if name.ends_with('/') {
            zip.add_directory(name.as_str(), file_options)?;
            continue;
        }
        zip.start_file(name.as_str(), file_options)?;
        match rewritten.get(name.as_str()) {
            Some(xml) => zip.write_all(xml.as_bytes())?,
            None => zip.write_all(&container.read_binary(name)?)?,
        }
    }

    let applied = rewritten.len();
    Ok((zip.finish()?.into_inner(), applied))
}

/// Add Morph transitions to every slide of `input`, writing `output`.
///
/// Returns the number of slides that received a transition.
pub fn add_morph_transitions(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &MorphOptions,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let input = input.as_ref();
    let output = output.as_ref();
    tracing::info!(input = %input.display(), "adding morph transitions");

    let data = std::fs::read(input)?;
    let (bytes, applied) = add_morph_transitions_to_bytes(data, options, reporter)?;
    std::fs::write(output, bytes)?;
    reporter.report(&BuildEvent::Saved {
        path: output.to_path_buf(),
    });
    Ok(applied)
}
