//! Carousel page selection.
//!
//! Every output page centers one source slide. Which template pattern a page
//! reuses, and which window of source slides it shows, follows a fixed
//! decision table over the center index, the slide count `N` and the number
//! of template patterns `K`:
//!
//! | Rule          | Applies when                 | Pattern        | Visible window              |
//! |---------------|------------------------------|----------------|-----------------------------|
//! | `Opening`     | `c == 0`                     | `0`            | `[0, min(3, N))`            |
//! | `Second`      | `c == 1`, `K >= 2`           | `1`            | `[0, min(4, N))`            |
//! | `Interior`    | `2 <= c < N - 2`             | `min(2, K-1)`  | `[c-2, min(c+3, N))`        |
//! | `Penultimate` | `c == N - 2`, `K >= 4`       | `min(3, K-1)`  | `[c-2, N)`                  |
//! | `Tail`        | anything else                | `min(K-1, 2)`  | `[c-2, N)`                  |
//!
//! Window starts saturate at zero. The reference decks only demonstrate
//! 3, 4 and 5 slot framings, so every interior page reuses the 5 slot
//! pattern.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A picture rectangle on a template page, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PictureSlot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PictureSlot {
    /// Create a slot from its position and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Horizontal center of the slot.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// The picture slots of one example page, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePattern {
    slots: Vec<PictureSlot>,
}

impl TemplatePattern {
    /// Create a pattern, ordering the slots by their left edge.
    pub fn new(mut slots: Vec<PictureSlot>) -> Self {
        slots.sort_by(|a, b| a.left.total_cmp(&b.left));
        Self { slots }
    }

    /// Slots in left-to-right order.
    pub fn slots(&self) -> &[PictureSlot] {
        &self.slots
    }

    /// Number of picture slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pattern has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Ordered set of template patterns taken from a reference deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSet {
    patterns: Vec<TemplatePattern>,
}

impl TemplateSet {
    /// Create a template set. Validation happens at selection time.
    pub fn new(patterns: Vec<TemplatePattern>) -> Self {
        Self { patterns }
    }

    /// Patterns in reference-deck order.
    pub fn patterns(&self) -> &[TemplatePattern] {
        &self.patterns
    }

    /// Pattern at `index`.
    pub fn get(&self, index: usize) -> Option<&TemplatePattern> {
        self.patterns.get(index)
    }

    /// Number of patterns (`K`).
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Reject sets that cannot drive a selection.
    pub fn validate(&self) -> Result<()> {
        if self.patterns.is_empty() {
            return Err(Error::InvalidInput(
                "template set contains no patterns".to_string(),
            ));
        }
        if let Some(index) = self.patterns.iter().position(TemplatePattern::is_empty) {
            return Err(Error::InvalidInput(format!(
                "template pattern {} has no picture slots",
                index
            )));
        }
        Ok(())
    }
}

/// Row of the selection table that produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRule {
    /// First page: the centered slide sits at the left of a 3 slide window.
    Opening,
    /// Second page: 4 slide window starting at the first slide.
    Second,
    /// Any page with two slides on either side.
    Interior,
    /// Second to last page, when the reference deck has a dedicated layout.
    Penultimate,
    /// Remaining trailing pages.
    Tail,
}

impl PageRule {
    /// Pick the rule for center index `center` of `image_count` pages with
    /// `pattern_count` template patterns.
    pub fn classify(center: usize, image_count: usize, pattern_count: usize) -> Self {
        match center {
            0 => PageRule::Opening,
            1 if pattern_count >= 2 => PageRule::Second,
            c if c >= 2 && c + 2 < image_count => PageRule::Interior,
            c if c + 2 == image_count && pattern_count >= 4 => PageRule::Penultimate,
            _ => PageRule::Tail,
        }
    }

    /// Template pattern reused by this rule. `pattern_count` must be non-zero.
    pub fn template_index(self, pattern_count: usize) -> usize {
        let last = pattern_count.saturating_sub(1);
        match self {
            PageRule::Opening => 0,
            PageRule::Second => 1,
            PageRule::Interior => last.min(2),
            PageRule::Penultimate => last.min(3),
            PageRule::Tail => last.min(2),
        }
    }

    /// Window of source slides shown for `center`.
    pub fn visible_range(self, center: usize, image_count: usize) -> Range<usize> {
        match self {
            PageRule::Opening => 0..image_count.min(3),
            PageRule::Second => 0..image_count.min(4),
            PageRule::Interior => center.saturating_sub(2)..(center + 3).min(image_count),
            PageRule::Penultimate | PageRule::Tail => center.saturating_sub(2)..image_count,
        }
    }
}

/// One generated carousel page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselPage {
    /// Source slide centered on this page (0-based).
    pub center_index: usize,
    /// Template pattern reused for the layout.
    pub template_index: usize,
    /// Source slides displayed, left to right.
    pub visible_range: Range<usize>,
    /// Table row that produced the page.
    pub rule: PageRule,
}

/// A source image assigned to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position of the slot in its pattern.
    pub slot_index: usize,
    /// Source image shown in the slot (0-based).
    pub image_index: usize,
    /// Rectangle to draw into.
    pub slot: PictureSlot,
}

impl CarouselPage {
    /// Pair the page's visible slides with the slots of its pattern.
    ///
    /// Slots beyond the window stay empty and slides beyond the slot count
    /// are dropped.
    pub fn placements(&self, templates: &TemplateSet) -> Vec<Placement> {
        let Some(pattern) = templates.get(self.template_index) else {
            return Vec::new();
        };

        pattern
            .slots()
            .iter()
            .zip(self.visible_range.clone())
            .enumerate()
            .map(|(slot_index, (slot, image_index))| Placement {
                slot_index,
                image_index,
                slot: *slot,
            })
            .collect()
    }

    /// Whether the centered slide is part of the visible window.
    pub fn shows_center(&self) -> bool {
        self.visible_range.contains(&self.center_index)
    }
}

/// Select the page for a single center index.
///
/// The template set must already be valid; see [`select_pages`].
pub fn select_page(templates: &TemplateSet, image_count: usize, center: usize) -> CarouselPage {
    let rule = PageRule::classify(center, image_count, templates.len());
    CarouselPage {
        center_index: center,
        template_index: rule.template_index(templates.len()),
        visible_range: rule.visible_range(center, image_count),
        rule,
    }
}

/// Compute one carousel page per source image, in source order.
///
/// Fails with [`Error::InvalidInput`] when the template set is empty or has a
/// pattern without slots, regardless of `image_count`. Zero images yield no
/// pages.
///
/// # Example
///
/// ```
/// use pptx_carousel::carousel::{select_pages, PictureSlot, TemplatePattern, TemplateSet};
///
/// let slot = PictureSlot::new(0.0, 0.0, 4.0, 2.25);
/// let templates = TemplateSet::new(vec![
///     TemplatePattern::new(vec![slot; 3]),
///     TemplatePattern::new(vec![slot; 4]),
///     TemplatePattern::new(vec![slot; 5]),
/// ]);
///
/// let pages = select_pages(&templates, 6)?;
/// assert_eq!(pages.len(), 6);
/// assert_eq!(pages[3].visible_range, 1..6);
/// # Ok::<(), pptx_carousel::Error>(())
/// ```
pub fn select_pages(templates: &TemplateSet, image_count: usize) -> Result<Vec<CarouselPage>> {
    templates.validate()?;

    Ok((0..image_count)
        .map(|center| select_page(templates, image_count, center))
        .collect())
}
