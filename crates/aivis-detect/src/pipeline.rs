//! Analysis entry point: catalog lookup, detection, ranking, scoring.

use std::borrow::Cow;
use std::collections::HashSet;

use aivis_core::{AppConfig, BrandCatalogEntry, ScoringPolicy};

use crate::catalog::CatalogSource;
use crate::detector::{term_key, MentionDetector};
use crate::error::DetectError;
use crate::ranker::{rank_mentions, BrandTally};
use crate::scorer::visibility_score;
use crate::types::{AnalysisOutcome, BrandAnalysis, FallbackReason};

/// Stateless brand visibility analyzer.
///
/// Holds only its configuration, so one instance can be shared freely across
/// tasks.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    policy: ScoringPolicy,
    competitor_keywords: Vec<String>,
}

impl Analyzer {
    #[must_use]
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            policy,
            competitor_keywords: Vec::new(),
        }
    }

    /// Extra competitor names checked for every organization, after the
    /// organization's own catalog. Names already in a catalog are ignored.
    #[must_use]
    pub fn with_competitor_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.competitor_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.scoring_policy).with_competitor_keywords(config.competitor_keywords.clone())
    }

    #[must_use]
    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Fetch the organization's catalog from `source` and analyze `response_text`.
    ///
    /// Never fails: an empty catalog, a failed lookup, or an unusable term all
    /// produce [`AnalysisOutcome::Fallback`] carrying
    /// [`BrandAnalysis::safe_default`].
    pub async fn analyze_response<S>(
        &self,
        source: &S,
        organization_id: &str,
        response_text: &str,
    ) -> AnalysisOutcome
    where
        S: CatalogSource + Sync,
    {
        let catalog = match source.fetch_catalog(organization_id).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(
                    organization_id,
                    error = %e,
                    "brand catalog lookup failed; returning safe default"
                );
                return AnalysisOutcome::fallback(FallbackReason::LookupFailed);
            }
        };

        let outcome = self.analyze_catalog(&catalog, response_text);
        if let Some(reason) = outcome.fallback_reason() {
            tracing::info!(organization_id, %reason, "brand analysis fell back to safe default");
        } else {
            let analysis = outcome.analysis();
            tracing::debug!(
                organization_id,
                score = analysis.score,
                present = analysis.org_brand_present,
                competitors = analysis.competitors.len(),
                "brand analysis complete"
            );
        }
        outcome
    }

    /// Analyze `response_text` against an already-fetched catalog.
    #[must_use]
    pub fn analyze_catalog(
        &self,
        catalog: &[BrandCatalogEntry],
        response_text: &str,
    ) -> AnalysisOutcome {
        if catalog.is_empty() {
            return AnalysisOutcome::fallback(FallbackReason::NoCatalog);
        }

        match self.try_analyze(catalog, response_text) {
            Ok(analysis) => AnalysisOutcome::Analyzed(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "brand detection failed; returning safe default");
                AnalysisOutcome::fallback(FallbackReason::DetectionFailed)
            }
        }
    }

    /// Every mentioned brand with its first offset and mention count, ordered
    /// the way prominence is ranked. Injected competitor keywords take part.
    ///
    /// Empty when the catalog is empty or a term cannot be compiled.
    #[must_use]
    pub fn mention_timeline(
        &self,
        catalog: &[BrandCatalogEntry],
        response_text: &str,
    ) -> Vec<BrandTally> {
        if catalog.is_empty() {
            return Vec::new();
        }
        let catalog = self.with_injected_competitors(catalog);
        match MentionDetector::new(&catalog) {
            Ok(detector) => rank_mentions(&detector.detect(response_text)).timeline,
            Err(e) => {
                tracing::warn!(error = %e, "brand detection failed; no timeline");
                Vec::new()
            }
        }
    }

    fn try_analyze(
        &self,
        catalog: &[BrandCatalogEntry],
        response_text: &str,
    ) -> Result<BrandAnalysis, DetectError> {
        let catalog = self.with_injected_competitors(catalog);
        let mentions = MentionDetector::new(&catalog)?.detect(response_text);
        let prominence = rank_mentions(&mentions);

        let score = visibility_score(
            self.policy,
            prominence.org_brand_present,
            prominence.org_brand_prominence,
            prominence.competitor_count,
        );

        Ok(BrandAnalysis {
            score,
            org_brand_present: prominence.org_brand_present,
            org_brand_prominence: prominence.org_brand_prominence,
            brands: prominence.brands,
            competitors: prominence.competitors,
        })
    }

    fn with_injected_competitors<'a>(
        &self,
        catalog: &'a [BrandCatalogEntry],
    ) -> Cow<'a, [BrandCatalogEntry]> {
        let known: HashSet<String> = catalog
            .iter()
            .flat_map(|entry| entry.term().terms().map(term_key).collect::<Vec<_>>())
            .collect();

        let extra: Vec<BrandCatalogEntry> = self
            .competitor_keywords
            .iter()
            .filter(|keyword| !known.contains(&term_key(keyword)))
            .map(|keyword| BrandCatalogEntry::competitor(keyword.trim()))
            .collect();

        if extra.is_empty() {
            Cow::Borrowed(catalog)
        } else {
            let mut merged = catalog.to_vec();
            merged.extend(extra);
            Cow::Owned(merged)
        }
    }
}
