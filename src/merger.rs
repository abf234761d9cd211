//! Multi-line heading merge
//!
//! Headings that wrap onto several lines come out of classification as
//! separate candidates. A greedy forward pass glues each run of consecutive,
//! typographically identical and vertically touching candidates back together.

use crate::classifier::Candidate;
use crate::config::OutlineConfig;
use crate::fragment::Rect;
use log::debug;

/// One logical heading built from one or more candidate lines
#[derive(Debug, Clone, PartialEq)]
pub struct MergedHeading {
    pub text: String,
    pub bbox: Rect,
    /// Page index (0-based) of the first member
    pub page_index: usize,
    /// Size of the first member
    pub font_size: f32,
    pub is_bold: bool,
    /// Indices of the source lines, in order
    pub lines: Vec<usize>,
}

impl From<&Candidate> for MergedHeading {
    fn from(candidate: &Candidate) -> Self {
        Self {
            text: candidate.text.clone(),
            bbox: candidate.bbox,
            page_index: candidate.page_index,
            font_size: candidate.font_size,
            is_bold: candidate.is_bold,
            lines: vec![candidate.line],
        }
    }
}

impl MergedHeading {
    /// Whether `next` continues this heading
    fn can_absorb(&self, next: &MergedHeading, config: &OutlineConfig) -> bool {
        let gap = next.bbox.y0 - self.bbox.y1;

        next.page_index == self.page_index
            && (next.font_size - self.font_size).abs() < config.merge_size_tolerance
            && next.is_bold == self.is_bold
            && gap < self.font_size * config.merge_gap_factor
    }

    fn absorb(&mut self, next: &MergedHeading) {
        self.text.push(' ');
        self.text.push_str(&next.text);
        self.bbox = self.bbox.union(&next.bbox);
        self.lines.extend_from_slice(&next.lines);
    }
}

/// Merge classified candidates into logical headings
pub fn merge_candidates(candidates: &[Candidate], config: &OutlineConfig) -> Vec<MergedHeading> {
    let headings: Vec<MergedHeading> = candidates.iter().map(MergedHeading::from).collect();
    let merged = merge_headings(&headings, config);
    debug!(
        "merged {} candidates into {} headings",
        candidates.len(),
        merged.len()
    );
    merged
}

/// Greedy forward merge over headings in reading order.
///
/// Applying this to its own output returns the output unchanged.
pub fn merge_headings(headings: &[MergedHeading], config: &OutlineConfig) -> Vec<MergedHeading> {
    let mut merged: Vec<MergedHeading> = Vec::with_capacity(headings.len());
    let mut i = 0;

    while i < headings.len() {
        let mut current = headings[i].clone();
        let mut j = i + 1;
        while j < headings.len() && current.can_absorb(&headings[j], config) {
            current.absorb(&headings[j]);
            j += 1;
        }
        merged.push(current);
        i = j;
    }

    merged
}
