//! First-mention ordering and org brand prominence.

use std::cmp::Ordering;

use serde::Serialize;

use crate::detector::term_key;
use crate::types::BrandMentions;

/// Display cap for org brand names in a [`Prominence`].
pub const MAX_ORG_BRANDS: usize = 3;
/// Display cap for competitor names in a [`Prominence`].
pub const MAX_COMPETITORS: usize = 10;

/// Summary of one mentioned brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandTally {
    pub name: String,
    pub is_org_brand: bool,
    pub first_offset: usize,
    pub mention_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prominence {
    pub org_brand_present: bool,
    /// 1-based rank of the earliest org brand mention among all first mentions.
    pub org_brand_prominence: Option<u32>,
    /// Org brand names found, catalog order, capped at [`MAX_ORG_BRANDS`].
    pub brands: Vec<String>,
    /// Competitor names found, catalog order, capped at [`MAX_COMPETITORS`].
    pub competitors: Vec<String>,
    /// Distinct competitors found, before the display cap.
    pub competitor_count: usize,
    /// Every mentioned brand ordered by first mention.
    pub timeline: Vec<BrandTally>,
}

/// Rank detector output.
///
/// Brands are ordered by `(first offset, org brand before competitor, catalog
/// position)`, so an org brand sharing its first offset with a competitor
/// always ranks ahead of it. Catalog entries repeating the same name on the
/// same side are merged into one brand.
#[must_use]
pub fn rank_mentions(mentions: &[BrandMentions]) -> Prominence {
    // (catalog position of first entry, tally)
    let mut tallies: Vec<(usize, BrandTally)> = Vec::new();

    for (catalog_pos, brand) in mentions.iter().enumerate() {
        let Some(first) = brand.first_mention() else {
            continue;
        };
        let first_offset = first.position;

        let key = term_key(&brand.name);
        let existing = tallies
            .iter_mut()
            .find(|(_, t)| t.is_org_brand == brand.is_org_brand && term_key(&t.name) == key);
        match existing {
            Some((_, tally)) => {
                tally.first_offset = tally.first_offset.min(first_offset);
                tally.mention_count += brand.offsets.len();
            }
            None => tallies.push((
                catalog_pos,
                BrandTally {
                    name: brand.name.clone(),
                    is_org_brand: brand.is_org_brand,
                    first_offset,
                    mention_count: brand.offsets.len(),
                },
            )),
        }
    }

    // Catalog order, for the display lists.
    let brands: Vec<String> = tallies
        .iter()
        .filter(|(_, t)| t.is_org_brand)
        .take(MAX_ORG_BRANDS)
        .map(|(_, t)| t.name.clone())
        .collect();
    let competitor_count = tallies.iter().filter(|(_, t)| !t.is_org_brand).count();
    let competitors: Vec<String> = tallies
        .iter()
        .filter(|(_, t)| !t.is_org_brand)
        .take(MAX_COMPETITORS)
        .map(|(_, t)| t.name.clone())
        .collect();

    tallies.sort_by(|(pos_a, a), (pos_b, b)| timeline_order(a, *pos_a, b, *pos_b));
    let timeline: Vec<BrandTally> = tallies.into_iter().map(|(_, t)| t).collect();

    let org_brand_prominence = timeline
        .iter()
        .position(|t| t.is_org_brand)
        .map(|idx| u32::try_from(idx + 1).unwrap_or(u32::MAX));

    Prominence {
        org_brand_present: org_brand_prominence.is_some(),
        org_brand_prominence,
        brands,
        competitors,
        competitor_count,
        timeline,
    }
}

fn timeline_order(a: &BrandTally, pos_a: usize, b: &BrandTally, pos_b: usize) -> Ordering {
    let side = |t: &BrandTally| u8::from(!t.is_org_brand);
    a.first_offset
        .cmp(&b.first_offset)
        .then_with(|| side(a).cmp(&side(b)))
        .then_with(|| pos_a.cmp(&pos_b))
}
