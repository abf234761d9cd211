//! Heading level assignment by style clustering
//!
//! Headings sharing a (rounded size, bold) style form one cluster. Clusters
//! are ranked largest first, bold before regular at equal size, and the rank
//! becomes the level. The scale is per document: a document using three
//! heading styles gets exactly levels 1 to 3.

use crate::merger::MergedHeading;
use log::debug;
use std::collections::BTreeSet;

/// Style cluster key. Orders by size, then bold after regular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleKey {
    pub size: i64,
    pub bold: bool,
}

impl StyleKey {
    pub fn of(heading: &MergedHeading) -> Self {
        Self {
            size: heading.font_size.round_ties_even() as i64,
            bold: heading.is_bold,
        }
    }
}

/// A heading with its hierarchy depth (1 = top)
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledHeading {
    pub heading: MergedHeading,
    pub level: u32,
}

/// Ranked style keys, highest level first
pub fn style_ranking(headings: &[MergedHeading]) -> Vec<StyleKey> {
    let keys: BTreeSet<StyleKey> = headings.iter().map(StyleKey::of).collect();
    keys.into_iter().rev().collect()
}

/// Attach a level to every heading, preserving order
pub fn assign_levels(headings: Vec<MergedHeading>) -> Vec<LeveledHeading> {
    let ranking = style_ranking(&headings);
    debug!("{} heading styles: {:?}", ranking.len(), ranking);

    headings
        .into_iter()
        .map(|heading| {
            let key = StyleKey::of(&heading);
            let rank = ranking
                .iter()
                .position(|k| *k == key)
                .unwrap_or(ranking.len());
            LeveledHeading {
                heading,
                level: rank as u32 + 1,
            }
        })
        .collect()
}
