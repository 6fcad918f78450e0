//! Slide image export.
//!
//! Rendering slides to pictures needs an office suite, so it sits behind
//! [`SlideImageExporter`]. [`CommandExporter`] drives any external tool that
//! can render one slide per invocation.

use crate::carousel::{slide_image_name, SourceImage};
use crate::error::{Error, Result};
use crate::events::{BuildEvent, Reporter};
use crate::model::PresentationDefinition;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders slides of a deck to image files.
pub trait SlideImageExporter {
    /// Render slide `slide_index` (1-based) of `pptx` into `out_dir`.
    ///
    /// Returns the path of the written image.
    fn export(&self, pptx: &Path, slide_index: usize, out_dir: &Path) -> Result<PathBuf>;

    /// Render slides `1..=slide_count`, skipping (and reporting) failures.
    fn export_all(
        &self,
        pptx: &Path,
        slide_count: usize,
        out_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Vec<SourceImage>> {
        std::fs::create_dir_all(out_dir)?;
        reporter.report(&BuildEvent::Started {
            task: "export",
            total: slide_count,
        });

        let mut exported = Vec::with_capacity(slide_count);
        for index in 1..=slide_count {
            match self.export(pptx, index, out_dir) {
                Ok(path) => {
                    reporter.report(&BuildEvent::SlideImageExported {
                        slide: index,
                        path: path.clone(),
                    });
                    exported.push(SourceImage { index, path });
                }
                Err(e) => reporter.report(&BuildEvent::SlideSkipped {
                    slide: index,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(exported)
    }
}

/// Runs an external command once per slide.
///
/// Arguments may contain `{input}` (the deck path), `{output}` (the image
/// path to write) and `{index}` (1-based slide number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExporter {
    program: String,
    args: Vec<String>,
}

impl CommandExporter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a whitespace-separated command line into program and arguments.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::InvalidInput("export command is empty".to_string()))?;
        Ok(Self::new(program).args(parts))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, input: &Path, output: &Path, index: usize) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        let index = index.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{index}", &index)
            })
            .collect()
    }
}

impl SlideImageExporter for CommandExporter {
    fn export(&self, pptx: &Path, slide_index: usize, out_dir: &Path) -> Result<PathBuf> {
        let output_path = out_dir.join(slide_image_name(slide_index));
        let args = self.expand_args(pptx, &output_path, slide_index);
        tracing::debug!(program = %self.program, ?args, "running export command");

        let output = Command::new(&self.program).args(&args).output().map_err(|e| {
            Error::Export(format!("failed to start '{}': {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Export(format!(
                "'{}' failed for slide {}: {}",
                self.program,
                slide_index,
                stderr.trim()
            )));
        }
        if !output_path.is_file() {
            return Err(Error::Export(format!(
                "'{}' did not write {}",
                self.program,
                output_path.display()
            )));
        }
        Ok(output_path)
    }
}

/// Export every slide of the deck a definition was read from and record the
/// image file names in the definition.
///
/// Returns the number of images written.
pub fn export_definition_images(
    definition: &mut PresentationDefinition,
    pptx: impl AsRef<Path>,
    exporter: &dyn SlideImageExporter,
    out_dir: impl AsRef<Path>,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let pptx = pptx.as_ref();
    let out_dir = out_dir.as_ref();
    let exported = exporter.export_all(pptx, definition.slides.len(), out_dir, reporter)?;

    for image in &exported {
        if let Some(slide) = definition.slides.iter_mut().find(|s| s.index == image.index) {
            slide.slide_image = Some(image.file_name());
        }
    }
    Ok(exported.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::model::SlideDefinition;
    use tempfile::TempDir;

    /// Writes a placeholder file for every slide except the listed ones.
    struct FakeExporter {
        failing: Vec<usize>,
    }

    impl SlideImageExporter for FakeExporter {
        fn export(&self, _pptx: &Path, slide_index: usize, out_dir: &Path) -> Result<PathBuf> {
            if self.failing.contains(&slide_index) {
                return Err(Error::Export(format!("slide {} is hidden", slide_index)));
            }
            let path = out_dir.join(slide_image_name(slide_index));
            std::fs::write(&path, b"png")?;
            Ok(path)
        }
    }

    #[test]
    fn test_expand_args() {
        let exporter = CommandExporter::from_command_line(
            "render --slide {index} --in {input} --out {output}",
        )
        .unwrap();
        assert_eq!(exporter.program(), "render");
        let args = exporter.expand_args(Path::new("deck.pptx"), Path::new("out/slide_002.png"), 2);
        assert_eq!(
            args,
            vec![
                "--slide",
                "2",
                "--in",
                "deck.pptx",
                "--out",
                "out/slide_002.png"
            ]
        );
    }

    #[test]
    fn test_empty_command_line() {
        assert!(matches!(
            CommandExporter::from_command_line("   "),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_export_all_skips_failures() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("deck_images");
        let log = EventLog::new();
        let exported = FakeExporter { failing: vec![2] }
            .export_all(Path::new("deck.pptx"), 3, &out_dir, &log)
            .unwrap();

        let indices: Vec<usize> = exported.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert!(out_dir.join("slide_003.png").is_file());
        assert_eq!(log.count(|e| matches!(e, BuildEvent::SlideSkipped { slide: 2, .. })), 1);
    }

    #[test]
    fn test_export_definition_images() {
        let dir = TempDir::new().unwrap();
        let mut definition = PresentationDefinition {
            slides: (1..=3)
                .map(|index| SlideDefinition {
                    index,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let count = export_definition_images(
            &mut definition,
            "deck.pptx",
            &FakeExporter { failing: vec![3] },
            dir.path(),
            &EventLog::new(),
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(definition.slides[0].slide_image.as_deref(), Some("slide_001.png"));
        assert_eq!(definition.slides[2].slide_image, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exporter_runs_program() {
        let dir = TempDir::new().unwrap();
        let exporter = CommandExporter::new("sh")
            .arg("-c")
            .arg("printf '%s' {index} > {output}");
        let path = exporter
            .export(Path::new("deck.pptx"), 4, dir.path())
            .unwrap();
        assert_eq!(path, dir.path().join("slide_004.png"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "4");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exporter_failure() {
        let dir = TempDir::new().unwrap();
        let err = CommandExporter::new("false")
            .export(Path::new("deck.pptx"), 1, dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::Export(_)));

        // succeeds but writes nothing
        let err = CommandExporter::new("true")
            .export(Path::new("deck.pptx"), 1, dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("did not write"));
    }
}
