//! Visibility rule tables.

use aivis_core::ScoringPolicy;

/// Score reported when detection could not run at all.
pub const FALLBACK_SCORE: f64 = 1.0;
/// Org brand absent and no competitor mentioned either.
pub const ABSENT_NEUTRAL_SCORE: f64 = 2.0;
/// Org brand absent while competitors are mentioned.
pub const ABSENT_OUTCOMPETED_SCORE: f64 = 0.0;
/// Starting point whenever the org brand is mentioned.
pub const PRESENT_BASE_SCORE: f64 = 6.0;
pub const MAX_SCORE: f64 = 10.0;

/// Map presence, prominence, and competitor density onto `[0, 10]`.
///
/// `competitor_count` is the number of distinct competitors mentioned. The
/// result is rounded per `policy`: one decimal for
/// [`ScoringPolicy::Graduated`], a whole number for [`ScoringPolicy::Stepped`].
#[must_use]
pub fn visibility_score(
    policy: ScoringPolicy,
    org_brand_present: bool,
    prominence: Option<u32>,
    competitor_count: usize,
) -> f64 {
    let raw = if org_brand_present {
        PRESENT_BASE_SCORE + prominence.map_or(0.0, |rank| prominence_bonus(policy, rank))
            - competitor_penalty(policy, competitor_count)
    } else if competitor_count == 0 {
        ABSENT_NEUTRAL_SCORE
    } else {
        ABSENT_OUTCOMPETED_SCORE
    };

    round_score(policy, raw.clamp(0.0, MAX_SCORE))
}

fn prominence_bonus(policy: ScoringPolicy, rank: u32) -> f64 {
    match (policy, rank) {
        (ScoringPolicy::Graduated, 1) => 3.0,
        (ScoringPolicy::Stepped, 1) | (_, 2..=3) => 2.0,
        (ScoringPolicy::Graduated, 4..=5) | (ScoringPolicy::Stepped, 4..=6) => 1.0,
        _ => 0.0,
    }
}

fn competitor_penalty(policy: ScoringPolicy, competitor_count: usize) -> f64 {
    match policy {
        ScoringPolicy::Graduated => {
            #[allow(clippy::cast_precision_loss)]
            let count = competitor_count as f64;
            (count * 0.2).min(2.0)
        }
        ScoringPolicy::Stepped => match competitor_count {
            9.. => 2.0,
            5..=8 => 1.0,
            _ => 0.0,
        },
    }
}

fn round_score(policy: ScoringPolicy, score: f64) -> f64 {
    match policy {
        ScoringPolicy::Graduated => (score * 10.0).round() / 10.0,
        ScoringPolicy::Stepped => score.round(),
    }
}
