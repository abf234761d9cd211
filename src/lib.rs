//! Document outline inference from positioned text
//!
//! This crate provides:
//! - Line assembly from positioned text fragments
//! - Title, heading and body classification from typography and position
//! - Multi-line heading merging and style-based level assignment
//! - Section building (each heading with the body text it owns)
//! - A lopdf-backed fragment source for PDF files, with parallel batch extraction

pub mod classifier;
pub mod config;
pub mod extractor;
pub mod fragment;
pub mod levels;
pub mod lines;
pub mod merger;
pub mod sections;

pub use classifier::{classify, Candidate, Classification, LineRole};
pub use config::OutlineConfig;
pub use extractor::PdfSource;
pub use fragment::{FontStyle, FontWeight, Fragment, FragmentSource, Page, Rect, Typography};
pub use levels::{assign_levels, LeveledHeading, StyleKey};
pub use lines::{assemble_document, assemble_lines, Line};
pub use merger::{merge_candidates, merge_headings, MergedHeading};
pub use sections::{build_sections, Section};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Inferred document structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub title: String,
    /// Sections in reading order
    pub sections: Vec<Section>,
}

/// Extract the outline of a PDF file with default settings
pub fn extract_outline_from_path<P: AsRef<Path>>(path: P) -> Result<Outline, OutlineError> {
    let source = PdfSource::open(path)?;
    extract_outline(&source, &OutlineConfig::default())
}

/// Extract the outline of a PDF held in memory with default settings
pub fn extract_outline_mem(buffer: &[u8]) -> Result<Outline, OutlineError> {
    let source = PdfSource::from_bytes(buffer)?;
    extract_outline(&source, &OutlineConfig::default())
}

/// Extract outlines for many PDF files in parallel.
///
/// Each document is loaded and processed independently; results come back in
/// input order, one per path.
pub fn extract_outlines_batch<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: &OutlineConfig,
) -> Vec<(PathBuf, Result<Outline, OutlineError>)> {
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = PdfSource::open(path).and_then(|source| extract_outline(&source, config));
            (path.to_path_buf(), result)
        })
        .collect()
}

/// Run the full pipeline over any fragment source.
///
/// A document with no text yields the fallback title and no sections; only
/// unreadable or oversized input is an error.
pub fn extract_outline<S: FragmentSource + ?Sized>(
    source: &S,
    config: &OutlineConfig,
) -> Result<Outline, OutlineError> {
    let page_count = source.page_count()?;
    if page_count > config.max_pages {
        warn!(
            "rejecting document with {} pages (limit {})",
            page_count, config.max_pages
        );
        return Err(OutlineError::SizeLimitExceeded {
            pages: page_count,
            limit: config.max_pages,
        });
    }

    let pages = source.pages()?;
    let lines = assemble_document(&pages, config);
    debug!("assembled {} lines from {} pages", lines.len(), pages.len());

    if lines.is_empty() {
        return Ok(Outline {
            title: config.fallback_title.clone(),
            sections: Vec::new(),
        });
    }

    let classification = classify(&lines, config);
    let merged = merge_candidates(&classification.candidates, config);
    let leveled = assign_levels(merged);

    let last_page_index = pages
        .iter()
        .map(|p| p.index)
        .max()
        .unwrap_or(0)
        .max(page_count.saturating_sub(1));
    let sections = build_sections(
        &lines,
        &classification.roles,
        &leveled,
        last_page_index,
        config,
    );
    info!(
        "extracted {} sections under title {:?}",
        sections.len(),
        classification.title
    );

    Ok(Outline {
        title: classification.title,
        sections,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("document has {pages} pages, exceeding the limit of {limit}")]
    SizeLimitExceeded { pages: usize, limit: usize },
}

impl From<lopdf::Error> for OutlineError {
    fn from(e: lopdf::Error) -> Self {
        OutlineError::Parse(e.to_string())
    }
}
