//! Fragment extraction from PDF using lopdf
//!
//! Walks each page's content stream, tracking the graphics and text state, and
//! emits one positioned fragment per text-showing operator. Positions are
//! flipped from PDF user space (origin bottom-left) to top-down coordinates.

use crate::fragment::{Fragment, FragmentSource, Page, Rect};
use crate::OutlineError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// US Letter height, used when a page has no usable MediaBox
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Ascent and descent as a share of the font size
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// Average glyph advance as a share of the font size
const GLYPH_WIDTH: f32 = 0.5;

/// A PDF document exposed as a fragment source
pub struct PdfSource {
    doc: Document,
}

impl PdfSource {
    /// Load a PDF from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OutlineError> {
        let doc = Document::load(path)?;
        Ok(Self { doc })
    }

    /// Load a PDF from a memory buffer
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, OutlineError> {
        let doc = Document::load_mem(buffer)?;
        Ok(Self { doc })
    }
}

impl FragmentSource for PdfSource {
    fn page_count(&self) -> Result<usize, OutlineError> {
        Ok(self.doc.get_pages().len())
    }

    fn pages(&self) -> Result<Vec<Page>, OutlineError> {
        // get_pages is keyed by 1-based page number, so enumeration is page order
        self.doc
            .get_pages()
            .into_values()
            .enumerate()
            .map(|(index, page_id)| extract_page(&self.doc, page_id, index))
            .collect()
    }
}

/// Decode one page into fragments
fn extract_page(doc: &Document, page_id: ObjectId, index: usize) -> Result<Page, OutlineError> {
    let height = page_height(doc, page_id);
    let fragments = extract_page_fragments(doc, page_id, index, height)?;
    Ok(Page {
        index,
        height,
        fragments,
    })
}

/// Resolve an indirect reference, or return the object itself
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Page height from the MediaBox, inherited through the page tree if needed
fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    let mut current = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = current {
        if let Some(media_box) = dict.get(b"MediaBox").ok().and_then(|o| resolve(doc, o)) {
            if let Ok(values) = media_box.as_array() {
                let nums: Vec<f32> = values
                    .iter()
                    .filter_map(|v| resolve(doc, v).and_then(get_number))
                    .collect();
                if nums.len() == 4 {
                    return (nums[3] - nums[1]).abs();
                }
            }
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    DEFAULT_PAGE_HEIGHT
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Text state while walking a content stream
struct TextState<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    page_index: usize,
    page_height: f32,
    ctm: [f32; 6],
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    /// Resource name of the current font, e.g. "F1"
    font_resource: String,
    font_size: f32,
    leading: f32,
    fragments: Vec<Fragment>,
}

impl TextState<'_> {
    /// Move to the start of the next line
    fn next_line(&mut self) {
        let leading = if self.leading > 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.line_matrix[5] -= leading;
        self.text_matrix = self.line_matrix;
    }

    /// Human font name for the current font resource
    fn font_name(&self) -> String {
        self.fonts
            .get(self.font_resource.as_bytes())
            .and_then(|dict| dict.get(b"BaseFont").and_then(Object::as_name).ok())
            .map(|name| String::from_utf8_lossy(name).to_string())
            .unwrap_or_else(|| self.font_resource.clone())
    }

    fn decode(&self, obj: &Object) -> Option<String> {
        extract_text_from_operand(obj, self.doc, &self.fonts, &self.font_resource)
    }

    /// Record a fragment at the current text position and move past it
    fn show(&mut self, text: String) {
        let advance = text.chars().count() as f32 * self.font_size * GLYPH_WIDTH;
        if !text.trim().is_empty() {
            self.record(text);
        }
        // Tm' = [1 0 0 1 advance 0] x Tm
        self.text_matrix[4] += advance * self.text_matrix[0];
        self.text_matrix[5] += advance * self.text_matrix[1];
    }

    fn record(&mut self, text: String) {
        let size = effective_font_size(self.font_size, &self.text_matrix);
        let combined = multiply_matrices(&self.text_matrix, &self.ctm);
        let (x, baseline) = (combined[4], combined[5]);
        let width = text.chars().count() as f32 * size * GLYPH_WIDTH;

        let bbox = Rect::new(
            x,
            self.page_height - (baseline + size * ASCENT),
            x + width,
            self.page_height - (baseline - size * DESCENT),
        );
        // Degenerate matrices (overflowing operands) have no position on the page
        if ![bbox.x0, bbox.y0, bbox.x1, bbox.y1, size]
            .iter()
            .all(|v| v.is_finite())
        {
            return;
        }
        let font_name = self.font_name();
        self.fragments
            .push(Fragment::new(text, bbox, font_name, size, self.page_index));
    }
}

/// Extract fragments from a single page
fn extract_page_fragments(
    doc: &Document,
    page_id: ObjectId,
    page_index: usize,
    page_height: f32,
) -> Result<Vec<Fragment>, OutlineError> {
    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| OutlineError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| OutlineError::Parse(e.to_string()))?;

    let identity = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut state = TextState {
        doc,
        fonts: doc.get_page_fonts(page_id).unwrap_or_default(),
        page_index,
        page_height,
        ctm: identity,
        text_matrix: identity,
        line_matrix: identity,
        font_resource: String::new(),
        font_size: 12.0,
        leading: 0.0,
        fragments: Vec::new(),
    };
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
    let mut in_text_block = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    state.ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let m = matrix_from_operands(&op.operands);
                    state.ctm = multiply_matrices(&m, &state.ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                state.text_matrix = identity;
                state.line_matrix = identity;
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        state.font_resource = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.line_matrix[4] += tx;
                    state.line_matrix[5] += ty;
                    state.text_matrix = state.line_matrix;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    state.text_matrix = matrix_from_operands(&op.operands);
                    state.line_matrix = state.text_matrix;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if in_text_block {
                    if let Some(text) = op.operands.first().and_then(|o| state.decode(o)) {
                        state.show(text);
                    }
                }
            }
            "TJ" => {
                if in_text_block {
                    if let Some(Ok(array)) = op.operands.first().map(Object::as_array) {
                        let combined: String =
                            array.iter().filter_map(|item| state.decode(item)).collect();
                        state.show(combined);
                    }
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = op.operands.first().and_then(|o| state.decode(o)) {
                    state.show(text);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(text) = op.operands.get(2).and_then(|o| state.decode(o)) {
                    state.show(text);
                }
            }
            _ => {}
        }
    }

    Ok(state.fragments)
}

fn matrix_from_operands(operands: &[Object]) -> [f32; 6] {
    let mut m = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    for (i, operand) in operands.iter().take(6).enumerate() {
        m[i] = get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
    }
    m
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Compute effective font size from base size and text matrix
/// Text matrix is [a, b, c, d, tx, ty] where a,d are scale factors
fn effective_font_size(base_size: f32, text_matrix: &[f32; 6]) -> f32 {
    let scale_x = (text_matrix[0].powi(2) + text_matrix[1].powi(2)).sqrt();
    let scale_y = (text_matrix[2].powi(2) + text_matrix[3].powi(2)).sqrt();
    base_size * scale_x.max(scale_y)
}

/// Extract text from a text operand, handling encoding
fn extract_text_from_operand(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &str,
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    // Latin-1
    Some(bytes.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_identity() {
        let identity = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let m = [2.0, 0.0, 0.0, 2.0, 10.0, 20.0];
        assert_eq!(multiply_matrices(&m, &identity), m);
        assert_eq!(multiply_matrices(&identity, &m), m);
    }

    #[test]
    fn test_effective_font_size_scales() {
        assert_eq!(effective_font_size(1.0, &[12.0, 0.0, 0.0, 12.0, 0.0, 0.0]), 12.0);
        assert_eq!(effective_font_size(10.0, &[1.0, 0.0, 0.0, 1.0, 5.0, 5.0]), 10.0);
    }

    #[test]
    fn test_matrix_defaults_for_bad_operands() {
        let ops = vec![
            Object::Integer(2),
            Object::Null,
            Object::Null,
            Object::Null,
            Object::Real(3.5),
            Object::Integer(4),
        ];
        assert_eq!(matrix_from_operands(&ops), [2.0, 0.0, 0.0, 1.0, 3.5, 4.0]);
    }

    #[test]
    fn test_latin1_fallback() {
        let fonts = BTreeMap::new();
        let doc = Document::with_version("1.5");
        let obj = Object::string_literal("Caf\u{e9}");
        let text = extract_text_from_operand(&obj, &doc, &fonts, "F1");
        assert!(text.is_some());
        assert_eq!(extract_text_from_operand(&Object::Null, &doc, &fonts, "F1"), None);
    }

    fn text_state(doc: &Document) -> TextState<'_> {
        let identity = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        TextState {
            doc,
            fonts: BTreeMap::new(),
            page_index: 0,
            page_height: 792.0,
            ctm: identity,
            text_matrix: [1.0, 0.0, 0.0, 1.0, 72.0, 700.0],
            line_matrix: identity,
            font_resource: "F1".to_string(),
            font_size: 10.0,
            leading: 0.0,
            fragments: Vec::new(),
        }
    }

    #[test]
    fn test_consecutive_shows_advance_along_the_line() {
        let doc = Document::with_version("1.5");
        let mut state = text_state(&doc);
        state.show("Hello".to_string());
        state.show(" ".to_string());
        state.show("World".to_string());

        assert_eq!(state.fragments.len(), 2);
        let (hello, world) = (&state.fragments[0], &state.fragments[1]);
        assert_eq!(hello.bbox.x0, 72.0);
        assert_eq!(hello.bbox.x1, 97.0);
        // the blank show still moves the pen by one glyph
        assert_eq!(world.bbox.x0, 102.0);
        assert_eq!(hello.bbox.y0, world.bbox.y0);
    }

    #[test]
    fn test_advance_follows_scaled_text_matrix() {
        let doc = Document::with_version("1.5");
        let mut state = text_state(&doc);
        state.font_size = 1.0;
        state.text_matrix = [12.0, 0.0, 0.0, 12.0, 100.0, 500.0];
        state.show("ab".to_string());
        state.show("cd".to_string());

        assert_eq!(state.fragments[0].bbox.x1, 112.0);
        assert_eq!(state.fragments[1].bbox.x0, 112.0);
        assert_eq!(state.fragments[1].typography.size, 12.0);
    }

    #[test]
    fn test_non_finite_positions_are_skipped() {
        let doc = Document::with_version("1.5");
        let mut state = text_state(&doc);
        state.ctm = [f32::INFINITY, 0.0, 0.0, 1.0, 0.0, 0.0];
        state.show("lost".to_string());
        assert!(state.fragments.is_empty());

        state.ctm = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        state.text_matrix = [1.0, 0.0, 0.0, 1.0, f32::NAN, 700.0];
        state.show("also lost".to_string());
        assert!(state.fragments.is_empty());
    }

    #[test]
    fn test_open_missing_file_is_error() {
        assert!(PdfSource::open("/nonexistent/file.pdf").is_err());
    }
}
