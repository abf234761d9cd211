//! Tunable thresholds for outline inference
//!
//! Every geometric or typographic cut-off used by the pipeline lives here.

/// Configuration for outline extraction
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Fragments whose vertical centers differ by at least this much start a new line
    pub line_center_tolerance: f32,
    /// Lines reaching above this fraction of the page height are headers
    pub header_band: f32,
    /// Lines reaching below this fraction of the page height are footers
    pub footer_band: f32,
    /// First-page lines at or above this share of the largest size form the title
    pub title_size_ratio: f32,
    /// Size-to-median ratio above which a line is a heading candidate
    pub heading_size_ratio: f32,
    /// Maximum font size difference for two candidates to merge
    pub merge_size_tolerance: f32,
    /// Maximum vertical gap for merging, as a multiple of the heading's font size
    pub merge_gap_factor: f32,
    /// Deepest heading level emitted as a section
    pub max_level: u32,
    /// Documents with more pages are rejected outright
    pub max_pages: usize,
    /// Baseline font size used when no body lines exist
    pub default_median_font_size: f32,
    /// Title used when the first page has nothing usable
    pub fallback_title: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            line_center_tolerance: 2.0,
            header_band: 0.10,
            footer_band: 0.92,
            title_size_ratio: 0.9,
            heading_size_ratio: 1.2,
            merge_size_tolerance: 1.0,
            merge_gap_factor: 0.5,
            max_level: 5,
            max_pages: 50,
            default_median_font_size: 12.0,
            fallback_title: "Untitled Document".to_string(),
        }
    }
}
