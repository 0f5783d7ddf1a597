use serde::{Deserialize, Serialize};

use crate::scorer::FALLBACK_SCORE;

/// A single occurrence of a brand term in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub brand_name: String,
    /// Character offset into the NFKC-normalized response text.
    pub position: usize,
    pub is_org_brand: bool,
}

/// Every offset at which any term of one catalog brand matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandMentions {
    pub name: String,
    pub is_org_brand: bool,
    /// Ascending, one entry per distinct match position.
    pub offsets: Vec<usize>,
}

impl BrandMentions {
    /// Earliest occurrence, or `None` when the brand never matched.
    #[must_use]
    pub fn first_mention(&self) -> Option<Mention> {
        self.offsets.iter().min().map(|&position| Mention {
            brand_name: self.name.clone(),
            position,
            is_org_brand: self.is_org_brand,
        })
    }
}

/// Result of analyzing one response for one organization.
///
/// `org_brand_prominence` is `Some` exactly when `org_brand_present` is true,
/// and `score` is always within `[0, 10]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAnalysis {
    pub score: f64,
    pub org_brand_present: bool,
    pub org_brand_prominence: Option<u32>,
    /// Org brand names found, at most three.
    pub brands: Vec<String>,
    /// Competitor names found, at most ten.
    pub competitors: Vec<String>,
}

impl BrandAnalysis {
    /// The low-neutral analysis returned whenever detection cannot run.
    #[must_use]
    pub fn safe_default() -> Self {
        Self {
            score: FALLBACK_SCORE,
            org_brand_present: false,
            org_brand_prominence: None,
            brands: Vec::new(),
            competitors: Vec::new(),
        }
    }
}

/// Why an analysis fell back to [`BrandAnalysis::safe_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The organization has no catalog rows.
    NoCatalog,
    /// The catalog lookup itself failed.
    LookupFailed,
    /// A term could not be turned into a matcher.
    DetectionFailed,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoCatalog => write!(f, "no_catalog"),
            FallbackReason::LookupFailed => write!(f, "lookup_failed"),
            FallbackReason::DetectionFailed => write!(f, "detection_failed"),
        }
    }
}

/// Either a real analysis or the safe default together with the reason for it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Analyzed(BrandAnalysis),
    Fallback {
        analysis: BrandAnalysis,
        reason: FallbackReason,
    },
}

impl AnalysisOutcome {
    #[must_use]
    pub fn fallback(reason: FallbackReason) -> Self {
        AnalysisOutcome::Fallback {
            analysis: BrandAnalysis::safe_default(),
            reason,
        }
    }

    #[must_use]
    pub fn analysis(&self) -> &BrandAnalysis {
        match self {
            AnalysisOutcome::Analyzed(analysis) | AnalysisOutcome::Fallback { analysis, .. } => {
                analysis
            }
        }
    }

    #[must_use]
    pub fn into_analysis(self) -> BrandAnalysis {
        match self {
            AnalysisOutcome::Analyzed(analysis) | AnalysisOutcome::Fallback { analysis, .. } => {
                analysis
            }
        }
    }

    #[must_use]
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            AnalysisOutcome::Analyzed(_) => None,
            AnalysisOutcome::Fallback { reason, .. } => Some(*reason),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }

    /// Stable label stored alongside persisted analyses.
    #[must_use]
    pub fn label(&self) -> String {
        self.fallback_reason()
            .map_or_else(|| "analyzed".to_string(), |r| r.to_string())
    }
}
