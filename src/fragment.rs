//! Positioned text fragments and the source trait that produces them
//!
//! Coordinates are top-down: `y0` is the top edge of a box and grows toward
//! the bottom of the page.

use crate::OutlineError;

/// Axis-aligned bounding box in top-down page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// Font weight as recovered from the font name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Black,
}

impl FontWeight {
    pub fn is_bold(self) -> bool {
        self >= FontWeight::Semibold
    }
}

/// Font posture as recovered from the font name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Typographic attributes of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Typography {
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl Typography {
    /// Derive weight and style from a PostScript-like font name such as
    /// `ABCDEF+Helvetica-BoldOblique`.
    pub fn from_font_name(font_name: &str, size: f32) -> Self {
        let lower = font_name.to_lowercase();

        let weight = if lower.contains("black") || lower.contains("heavy") {
            FontWeight::Black
        } else if lower.contains("semibold") || lower.contains("demibold") {
            FontWeight::Semibold
        } else if lower.contains("bold") {
            FontWeight::Bold
        } else if lower.contains("medium") {
            FontWeight::Medium
        } else if lower.contains("light") || lower.contains("thin") {
            FontWeight::Light
        } else {
            FontWeight::Regular
        };

        let style = if lower.contains("italic") || lower.contains("oblique") {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };

        Self {
            size,
            weight,
            style,
        }
    }
}

/// Smallest positioned unit of text supplied by a source
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
    pub bbox: Rect,
    pub font_name: String,
    pub typography: Typography,
    /// Page index (0-based)
    pub page_index: usize,
}

impl Fragment {
    /// Build a fragment, deriving typography from the font name
    pub fn new(
        text: impl Into<String>,
        bbox: Rect,
        font_name: impl Into<String>,
        font_size: f32,
        page_index: usize,
    ) -> Self {
        let font_name = font_name.into();
        let typography = Typography::from_font_name(&font_name, font_size);
        Self {
            text: text.into(),
            bbox,
            font_name,
            typography,
            page_index,
        }
    }
}

/// All fragments of one page
#[derive(Debug, Clone)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,
    /// Page height in layout units, used for the header/footer bands
    pub height: f32,
    pub fragments: Vec<Fragment>,
}

/// Anything that can hand the engine positioned text, page by page.
///
/// `page_count` must be cheap enough to call before `pages`, since the engine
/// rejects oversized documents before reading any fragments.
pub trait FragmentSource {
    fn page_count(&self) -> Result<usize, OutlineError>;

    /// Pages in ascending index order
    fn pages(&self) -> Result<Vec<Page>, OutlineError>;
}

impl FragmentSource for [Page] {
    fn page_count(&self) -> Result<usize, OutlineError> {
        Ok(self.len())
    }

    fn pages(&self) -> Result<Vec<Page>, OutlineError> {
        let mut pages = self.to_vec();
        pages.sort_by_key(|p| p.index);
        Ok(pages)
    }
}

impl FragmentSource for Vec<Page> {
    fn page_count(&self) -> Result<usize, OutlineError> {
        self.as_slice().page_count()
    }

    fn pages(&self) -> Result<Vec<Page>, OutlineError> {
        self.as_slice().pages()
    }
}
