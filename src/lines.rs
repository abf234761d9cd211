//! Line assembly
//!
//! Groups a page's fragments into visual lines by vertical alignment and
//! consolidates each line's typography.

use crate::config::OutlineConfig;
use crate::fragment::{Fragment, Page, Rect};

/// A line of text (one vertically aligned group of fragments)
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub bbox: Rect,
    /// Page index (0-based)
    pub page_index: usize,
    /// Most frequent fragment size in the line
    pub font_size: f32,
    /// Most frequent fragment font in the line
    pub font_name: String,
    pub is_bold: bool,
    pub is_header_footer: bool,
}

/// Assemble lines for every page, pages in ascending order
pub fn assemble_document(pages: &[Page], config: &OutlineConfig) -> Vec<Line> {
    let mut ordered: Vec<&Page> = pages.iter().collect();
    ordered.sort_by_key(|p| p.index);

    ordered
        .into_iter()
        .flat_map(|page| assemble_lines(page, config))
        .collect()
}

/// Group one page's fragments into lines, top to bottom
pub fn assemble_lines(page: &Page, config: &OutlineConfig) -> Vec<Line> {
    if page.fragments.is_empty() {
        return Vec::new();
    }

    let mut fragments: Vec<&Fragment> = page.fragments.iter().collect();
    fragments.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut groups: Vec<Vec<&Fragment>> = Vec::new();
    let mut prev_center: Option<f32> = None;

    for fragment in fragments {
        let center = fragment.bbox.center_y();
        let same_line =
            prev_center.is_some_and(|prev| (center - prev).abs() < config.line_center_tolerance);

        match groups.last_mut() {
            Some(group) if same_line => group.push(fragment),
            _ => groups.push(vec![fragment]),
        }
        prev_center = Some(center);
    }

    groups
        .into_iter()
        .filter_map(|group| consolidate(group, page, config))
        .collect()
}

/// Merge one group into a `Line`, or `None` when it carries no text
fn consolidate(mut group: Vec<&Fragment>, page: &Page, config: &OutlineConfig) -> Option<Line> {
    group.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

    let text = group
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        return None;
    }

    let bbox = group
        .iter()
        .skip(1)
        .fold(group[0].bbox, |acc, f| acc.union(&f.bbox));

    let font_size = mode(group.iter().map(|f| sanitize_size(f.typography.size))).unwrap_or(0.0);
    let font_name = mode(group.iter().map(|f| f.font_name.as_str()))
        .unwrap_or_default()
        .to_string();
    let is_bold = group
        .iter()
        .find(|f| f.font_name == font_name)
        .map(|f| f.typography.weight.is_bold())
        .unwrap_or(false);

    Some(Line {
        text,
        bbox,
        page_index: page.index,
        font_size,
        font_name,
        is_bold,
        is_header_footer: in_header_footer_band(&bbox, page.height, config),
    })
}

fn sanitize_size(size: f32) -> f32 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        0.0
    }
}

/// Whether the box reaches into the top or bottom band of the page
fn in_header_footer_band(bbox: &Rect, page_height: f32, config: &OutlineConfig) -> bool {
    if page_height <= 0.0 {
        return false;
    }
    bbox.y0 < page_height * config.header_band || bbox.y1 > page_height * config.footer_band
}

/// Most frequent value; ties go to the value seen first
fn mode<T: PartialEq>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32, size: f32, font: &str) -> Fragment {
        let width = text.len() as f32 * size * 0.5;
        Fragment::new(text, Rect::new(x, y, x + width, y + size), font, size, 0)
    }

    fn page(fragments: Vec<Fragment>) -> Page {
        Page {
            index: 0,
            height: 800.0,
            fragments,
        }
    }

    #[test]
    fn test_groups_by_vertical_center() {
        let p = page(vec![
            frag("World", 160.0, 200.0, 12.0, "Helvetica"),
            frag("Hello", 100.0, 200.5, 12.0, "Helvetica"),
            frag("Next line", 100.0, 220.0, 12.0, "Helvetica"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello World");
        assert_eq!(lines[1].text, "Next line");
    }

    #[test]
    fn test_center_difference_at_tolerance_splits() {
        let p = page(vec![
            frag("A", 100.0, 200.0, 12.0, "Helvetica"),
            frag("B", 150.0, 202.0, 12.0, "Helvetica"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_blank_groups_are_skipped() {
        let p = page(vec![
            frag("   ", 100.0, 200.0, 12.0, "Helvetica"),
            frag("Body", 100.0, 240.0, 12.0, "Helvetica"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Body");
    }

    #[test]
    fn test_modal_typography() {
        let p = page(vec![
            frag("1.", 100.0, 200.0, 14.0, "Helvetica-Bold"),
            frag("Scope", 120.0, 200.0, 12.0, "Helvetica"),
            frag("and", 170.0, 200.0, 12.0, "Helvetica"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].font_size, 12.0);
        assert_eq!(lines[0].font_name, "Helvetica");
        assert!(!lines[0].is_bold);
        assert_eq!(lines[0].bbox.x0, 100.0);
        assert_eq!(lines[0].bbox.y0, 200.0);
    }

    #[test]
    fn test_mode_tie_prefers_first_in_reading_order() {
        let p = page(vec![
            frag("Bold", 100.0, 200.0, 14.0, "Arial-Bold"),
            frag("plain", 150.0, 200.0, 12.0, "Arial"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        assert_eq!(lines[0].font_size, 14.0);
        assert!(lines[0].is_bold);
    }

    #[test]
    fn test_header_footer_bands() {
        let p = page(vec![
            frag("Running header", 100.0, 30.0, 10.0, "Helvetica"),
            frag("Body text", 100.0, 400.0, 10.0, "Helvetica"),
            frag("Page 3", 100.0, 760.0, 10.0, "Helvetica"),
        ]);
        let lines = assemble_lines(&p, &OutlineConfig::default());
        let flags: Vec<bool> = lines.iter().map(|l| l.is_header_footer).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_document_lines_follow_page_order() {
        let mut second = page(vec![frag("Second", 100.0, 300.0, 12.0, "Helvetica")]);
        second.index = 1;
        let first = page(vec![frag("First", 100.0, 500.0, 12.0, "Helvetica")]);
        let lines = assemble_document(&[second, first], &OutlineConfig::default());
        assert_eq!(lines[0].text, "First");
        assert_eq!(lines[1].page_index, 1);
    }

    #[test]
    fn test_nan_positions_do_not_break_sorting() {
        let fragments = (0..200)
            .map(|i| {
                let x = 72.0 + (i % 5) as f32 * 40.0;
                let mut f = frag(&format!("w{}", i), x, (i * 3) as f32, 10.0, "Helvetica");
                if i % 7 == 0 {
                    f.bbox.y0 = f32::NAN;
                }
                if i % 11 == 0 {
                    f.bbox.x0 = f32::NAN;
                }
                f
            })
            .collect();
        let lines = assemble_lines(&page(fragments), &OutlineConfig::default());

        let words: usize = lines.iter().map(|l| l.text.split(' ').count()).sum();
        assert_eq!(words, 200);
    }

    #[test]
    fn test_mode_helper() {
        assert_eq!(mode([3, 1, 3, 1].into_iter()), Some(3));
        assert_eq!(mode([2, 5, 5].into_iter()), Some(5));
        assert_eq!(mode(std::iter::empty::<i32>()), None);
    }
}
