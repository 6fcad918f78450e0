//! Progress and warning events emitted by the builders.
//!
//! Library code never prints. Builders report what they do through a
//! [`Reporter`]; the CLI turns events into progress bars, tests collect them,
//! and [`TracingReporter`] forwards them to `tracing`.

use std::cell::RefCell;
use std::path::PathBuf;

/// Something worth telling the caller while a deck is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// Work on a deck began; `total` is the number of pages or slides.
    Started { task: &'static str, total: usize },
    /// A source slide was read into the definition.
    SlideExtracted { slide: usize, total: usize },
    /// A slide image was written by an exporter.
    SlideImageExported { slide: usize, path: PathBuf },
    /// A slide could not be exported, extracted or rebuilt and was skipped.
    SlideSkipped { slide: usize, reason: String },
    /// An output page was written. `center` is set for carousel pages.
    PageWritten {
        page: usize,
        total: usize,
        images: usize,
        center: Option<usize>,
    },
    /// One image could not be placed; the page is still written.
    ImageSkipped {
        page: usize,
        path: PathBuf,
        reason: String,
    },
    /// A Morph transition was written into a slide part.
    TransitionApplied { slide: usize, total: usize },
    /// A file was written.
    Saved { path: PathBuf },
    /// A temporary file or directory was removed.
    Removed { path: PathBuf },
}

/// Receives build events.
pub trait Reporter {
    fn report(&self, event: &BuildEvent);
}

impl<F> Reporter for F
where
    F: Fn(&BuildEvent),
{
    fn report(&self, event: &BuildEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &BuildEvent) {}
}

/// Forwards events to `tracing`; skips become warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &BuildEvent) {
        match event {
            BuildEvent::Started { task, total } => {
                tracing::info!(task = *task, total = *total, "started")
            }
            BuildEvent::SlideExtracted { slide, total } => {
                tracing::debug!(slide = *slide, total = *total, "processed slide")
            }
            BuildEvent::SlideImageExported { slide, path } => {
                tracing::debug!(slide = *slide, path = %path.display(), "exported slide image")
            }
            BuildEvent::SlideSkipped { slide, reason } => {
                tracing::warn!(slide = *slide, "skipped slide: {}", reason)
            }
            BuildEvent::PageWritten {
                page,
                total,
                images,
                center,
            } => tracing::debug!(
                page = *page,
                total = *total,
                images = *images,
                center = ?center,
                "created page"
            ),
            BuildEvent::ImageSkipped { page, path, reason } => tracing::warn!(
                page = *page,
                path = %path.display(),
                "could not add image: {}",
                reason
            ),
            BuildEvent::TransitionApplied { slide, total } => {
                tracing::debug!(slide = *slide, total = *total, "added morph transition")
            }
            BuildEvent::Saved { path } => tracing::info!(path = %path.display(), "saved"),
            BuildEvent::Removed { path } => tracing::debug!(path = %path.display(), "removed"),
        }
    }
}

/// Records every event, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<BuildEvent>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.borrow().clone()
    }

    /// Number of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BuildEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }
}

impl Reporter for EventLog {
    fn report(&self, event: &BuildEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
