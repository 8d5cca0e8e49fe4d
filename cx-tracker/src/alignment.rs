//! Vertical alignment of paired source and target sections
//!
//! Source and target sections reflow independently (different lengths,
//! fonts, scripts). After content changes or a resize, the shorter box of
//! each pair gets its minimum height raised step by step until both render
//! at the same height. This is best effort: a pair that does not converge
//! within the step bound is logged and left as is.

use crate::config::AlignmentConfig;
use crate::debounce::Debounce;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// Measurements and styling of the rendered section boxes
pub trait Layout {
    /// Section numbers of the pairs currently rendered
    fn section_numbers(&self) -> Vec<u32>;

    /// Tables and similar elements ignore minimum heights
    fn is_table_like(&self, section_number: u32) -> bool;

    /// Rendered height, `None` if the box is not rendered
    fn height(&self, side: Side, section_number: u32) -> Option<f32>;

    fn set_min_height(&mut self, side: Side, section_number: u32, px: f32);

    fn reset_min_height(&mut self, side: Side, section_number: u32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignOutcome {
    AlreadyAligned,
    Aligned { side: Side, steps: usize },
    NotConverged { side: Side, steps: usize },
    SkippedTable,
    Missing,
}

/// Align one pair of sections
pub fn align_pair<L: Layout>(
    layout: &mut L,
    section_number: u32,
    config: &AlignmentConfig,
) -> AlignOutcome {
    if layout.is_table_like(section_number) {
        return AlignOutcome::SkippedTable;
    }
    layout.reset_min_height(Side::Source, section_number);
    layout.reset_min_height(Side::Target, section_number);

    let (Some(source), Some(target)) = (
        layout.height(Side::Source, section_number),
        layout.height(Side::Target, section_number),
    ) else {
        return AlignOutcome::Missing;
    };
    if source == target {
        return AlignOutcome::AlreadyAligned;
    }

    let (side, mut min_height, goal) = if target < source {
        (Side::Target, target, source)
    } else {
        (Side::Source, source, target)
    };

    let mut steps = 0;
    loop {
        let current = layout.height(side, section_number).unwrap_or(min_height);
        if current >= goal {
            debug!(section = section_number, ?side, steps, "Section pair aligned");
            return AlignOutcome::Aligned { side, steps };
        }
        if steps >= config.max_steps {
            warn!(
                section = section_number,
                ?side,
                steps,
                height = current,
                goal,
                "Section pair alignment did not converge"
            );
            return AlignOutcome::NotConverged { side, steps };
        }
        min_height = (min_height + config.step_px).min(goal);
        layout.set_min_height(side, section_number, min_height);
        steps += 1;
    }
}

/// Debounced alignment of every rendered pair
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignmentConfig,
    debounce: Debounce,
}

impl Aligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            debounce: Debounce::new(config.debounce()),
            config,
        }
    }

    /// Content changed or the viewport was resized
    pub fn schedule(&mut self, now: Instant) {
        self.debounce.schedule(now);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Align all pairs if the quiet period has passed
    pub fn poll<L: Layout>(&mut self, now: Instant, layout: &mut L) -> Option<Vec<(u32, AlignOutcome)>> {
        if self.debounce.fire(now) {
            Some(self.align_all(layout))
        } else {
            None
        }
    }

    pub fn align_all<L: Layout>(&self, layout: &mut L) -> Vec<(u32, AlignOutcome)> {
        layout
            .section_numbers()
            .into_iter()
            .map(|number| (number, align_pair(layout, number, &self.config)))
            .collect()
    }
}

/// Layout for hosts without rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl Layout for NoLayout {
    fn section_numbers(&self) -> Vec<u32> {
        Vec::new()
    }

    fn is_table_like(&self, _section_number: u32) -> bool {
        false
    }

    fn height(&self, _side: Side, _section_number: u32) -> Option<f32> {
        None
    }

    fn set_min_height(&mut self, _side: Side, _section_number: u32, _px: f32) {}

    fn reset_min_height(&mut self, _side: Side, _section_number: u32) {}
}
