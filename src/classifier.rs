//! Layout classification
//!
//! Splits assembled lines into title, header/footer, heading candidates and
//! body text using typography and position only:
//! - Title: the largest text on the first page
//! - Baseline: median size of everything that is not title or page furniture
//! - Candidates: bold, numbered, or noticeably larger than the baseline

use crate::config::OutlineConfig;
use crate::fragment::Rect;
use crate::lines::Line;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading section numbering: "1.2.3", "A.", "(a)", "IV."
static NUMBERING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(\.\d+)*|[A-Z]\.|\([a-z]\)|[IVXLCDM]+\.)").unwrap());

/// The one role every line plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    HeaderFooter,
    Heading,
    Body,
}

/// A line flagged as a potential heading
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index of the source line
    pub line: usize,
    pub text: String,
    pub bbox: Rect,
    pub page_index: usize,
    pub font_size: f32,
    pub is_bold: bool,
}

impl Candidate {
    fn from_line(index: usize, line: &Line) -> Self {
        Self {
            line: index,
            text: line.text.clone(),
            bbox: line.bbox,
            page_index: line.page_index,
            font_size: line.font_size,
            is_bold: line.is_bold,
        }
    }
}

/// Result of classifying a document's lines
#[derive(Debug, Clone)]
pub struct Classification {
    pub title: String,
    /// One role per input line, same indexing
    pub roles: Vec<LineRole>,
    pub median_font_size: f32,
    /// Heading candidates in reading order
    pub candidates: Vec<Candidate>,
}

/// Classify all lines of a document
pub fn classify(lines: &[Line], config: &OutlineConfig) -> Classification {
    let (title, title_lines) = detect_title(lines, config);

    let mut roles: Vec<LineRole> = lines
        .iter()
        .map(|l| {
            if l.is_header_footer {
                LineRole::HeaderFooter
            } else {
                LineRole::Body
            }
        })
        .collect();
    for &idx in &title_lines {
        roles[idx] = LineRole::Title;
    }

    let median_font_size = median_font_size(lines, &roles, config);

    let mut candidates = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if roles[idx] != LineRole::Body {
            continue;
        }
        if is_heading_candidate(line, median_font_size, config) {
            roles[idx] = LineRole::Heading;
            candidates.push(Candidate::from_line(idx, line));
        }
    }

    debug!(
        "classified {} lines: {} title, {} candidates, median size {:.1}",
        lines.len(),
        title_lines.len(),
        candidates.len(),
        median_font_size
    );

    Classification {
        title,
        roles,
        median_font_size,
        candidates,
    }
}

/// Find the title text and the indices of the lines it was built from
pub fn detect_title(lines: &[Line], config: &OutlineConfig) -> (String, Vec<usize>) {
    let first_page: Vec<(usize, &Line)> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.page_index == 0 && !l.is_header_footer)
        .collect();

    let max_font_size = first_page
        .iter()
        .map(|(_, l)| l.font_size)
        .filter(|&size| size > 0.0)
        .fold(None, |acc: Option<f32>, size| Some(acc.map_or(size, |m| m.max(size))));

    let Some(max_font_size) = max_font_size else {
        return (config.fallback_title.clone(), Vec::new());
    };

    let mut title_lines: Vec<(usize, &Line)> = first_page
        .into_iter()
        .filter(|(_, l)| l.font_size >= max_font_size * config.title_size_ratio)
        .collect();
    title_lines.sort_by(|a, b| a.1.bbox.y0.total_cmp(&b.1.bbox.y0));

    let title = title_lines
        .iter()
        .map(|(_, l)| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    (title, title_lines.into_iter().map(|(idx, _)| idx).collect())
}

/// Median size over lines still marked as body
fn median_font_size(lines: &[Line], roles: &[LineRole], config: &OutlineConfig) -> f32 {
    let mut sizes: Vec<f32> = lines
        .iter()
        .zip(roles)
        .filter(|(_, role)| **role == LineRole::Body)
        .map(|(l, _)| l.font_size)
        .collect();

    if sizes.is_empty() {
        return config.default_median_font_size;
    }

    sizes.sort_by(f32::total_cmp);
    let mid = sizes.len() / 2;
    if sizes.len() % 2 == 0 {
        (sizes[mid - 1] + sizes[mid]) / 2.0
    } else {
        sizes[mid]
    }
}

/// Whether the text opens with section numbering
pub fn has_leading_numbering(text: &str) -> bool {
    NUMBERING_RE.is_match(text)
}

/// Bold, numbered, or larger than the body baseline
pub fn is_heading_candidate(line: &Line, median_font_size: f32, config: &OutlineConfig) -> bool {
    let size_ratio = if median_font_size > 0.0 {
        line.font_size / median_font_size
    } else {
        1.0
    };

    line.is_bold || has_leading_numbering(&line.text) || size_ratio > config.heading_size_ratio
}
