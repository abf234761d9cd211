//! Section building
//!
//! Each heading owns the body lines between its own bottom edge and the top
//! edge of the next heading (or the end of the document for the last one).
//! Body lines and headings are both in reading order, so one cursor walks the
//! lines while the headings advance in lockstep.

use crate::classifier::LineRole;
use crate::config::OutlineConfig;
use crate::levels::LeveledHeading;
use crate::lines::Line;
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

/// A heading together with the body text it owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub text: String,
    pub level: u32,
    /// Page index (0-based) of the heading
    pub page_num: usize,
    pub content: String,
}

/// A (page, y) position in reading order
#[derive(Debug, Clone, Copy)]
struct Boundary {
    page: usize,
    y: f32,
}

impl Boundary {
    /// The line starts strictly below this boundary
    fn precedes(&self, line: &Line) -> bool {
        line.page_index > self.page || (line.page_index == self.page && line.bbox.y0 > self.y)
    }

    /// The line ends strictly above this boundary
    fn follows(&self, line: &Line) -> bool {
        line.page_index < self.page || (line.page_index == self.page && line.bbox.y1 < self.y)
    }

    /// The line starts at or below this boundary, and so does every later line
    fn passed_by(&self, line: &Line) -> bool {
        line.page_index > self.page || (line.page_index == self.page && line.bbox.y0 >= self.y)
    }
}

/// Attach body content to headings and keep the ones worth emitting
pub fn build_sections(
    lines: &[Line],
    roles: &[LineRole],
    headings: &[LeveledHeading],
    last_page_index: usize,
    config: &OutlineConfig,
) -> Vec<Section> {
    let heading_texts: HashSet<&str> = headings.iter().map(|h| h.heading.text.as_str()).collect();

    let mut body: Vec<&Line> = lines
        .iter()
        .zip(roles)
        .filter(|(line, role)| {
            **role == LineRole::Body
                && !line.is_header_footer
                && !heading_texts.contains(line.text.as_str())
        })
        .map(|(line, _)| line)
        .collect();
    body.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.bbox.y0.total_cmp(&b.bbox.y0))
    });

    let mut sections = Vec::new();
    let mut cursor = 0;

    for (i, leveled) in headings.iter().enumerate() {
        let heading = &leveled.heading;
        let start = Boundary {
            page: heading.page_index,
            y: heading.bbox.y1,
        };
        let end = match headings.get(i + 1) {
            Some(next) => Boundary {
                page: next.heading.page_index,
                y: next.heading.bbox.y0,
            },
            None => Boundary {
                page: last_page_index,
                y: f32::INFINITY,
            },
        };

        // Lines overlapping the heading itself belong to no section
        while cursor < body.len() && !start.precedes(body[cursor]) {
            cursor += 1;
        }

        let mut owned: Vec<&str> = Vec::new();
        while cursor < body.len() && !end.passed_by(body[cursor]) {
            let line = body[cursor];
            if end.follows(line) {
                let text = line.text.trim();
                if !text.is_empty() {
                    owned.push(text);
                }
            }
            cursor += 1;
        }

        let content = owned.join(" ").trim().to_string();
        if content.is_empty() || leveled.level > config.max_level {
            continue;
        }

        sections.push(Section {
            text: heading.text.clone(),
            level: leveled.level,
            page_num: heading.page_index,
            content,
        });
    }

    debug!(
        "built {} sections from {} headings ({} body lines)",
        sections.len(),
        headings.len(),
        body.len()
    );

    sections
}
