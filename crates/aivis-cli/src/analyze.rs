//! `analyze` command handler.

use std::path::Path;

use aivis_core::AppConfig;
use aivis_db::{NewBrandAnalysis, PgCatalog};
use aivis_detect::{
    AnalysisOutcome, Analyzer, BrandAnalysis, BrandTally, CatalogSource, StaticCatalog,
};
use serde::Serialize;

use crate::SourceKind;

pub(crate) struct AnalyzeRequest<'a> {
    pub(crate) organization_id: &'a str,
    pub(crate) response_text: &'a str,
    pub(crate) source: SourceKind,
    pub(crate) persist: bool,
    pub(crate) prompt_id: Option<&'a str>,
    pub(crate) provider: Option<&'a str>,
    pub(crate) timeline: bool,
}

/// Printed result: the analysis fields, plus the mention timeline on request.
#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeOutput<'a> {
    #[serde(flatten)]
    pub(crate) analysis: &'a BrandAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) timeline: Option<Vec<BrandTally>>,
}

/// Resolve the response text from `--text` or `--file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or neither source is given.
pub(crate) fn read_response_text(text: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display())),
        (None, None) => anyhow::bail!("either --text or --file is required"),
    }
}

/// Analyze one response and print the analysis as pretty JSON on stdout,
/// with the mention timeline appended when requested.
///
/// Analysis itself never fails; errors come only from loading the YAML
/// catalog, connecting to the database, or persisting the result.
///
/// # Errors
///
/// Returns an error if the catalog file is invalid, the database is
/// unreachable, or the organization id is not a UUID when persisting.
pub(crate) async fn run_analyze(config: &AppConfig, request: AnalyzeRequest<'_>) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(config);

    let needs_db = request.persist || request.source == SourceKind::Db;
    let pool = if needs_db {
        Some(crate::connect(config).await?)
    } else {
        None
    };

    let (outcome, timeline) = match (&pool, request.source) {
        (Some(pool), SourceKind::Db) => {
            let source = PgCatalog::new(pool.clone());
            analyze_from(&analyzer, &source, &request).await
        }
        _ => {
            let file = aivis_core::load_catalog(&config.catalog_path)?;
            let source = StaticCatalog::from(file);
            analyze_from(&analyzer, &source, &request).await
        }
    };

    if let Some(reason) = outcome.fallback_reason() {
        tracing::warn!(organization_id = request.organization_id, %reason, "reporting safe default");
    }

    if let Some(pool) = pool.as_ref().filter(|_| request.persist) {
        let id = persist(pool, &request, &outcome).await?;
        tracing::info!(id, "analysis stored");
    }

    let output = AnalyzeOutput {
        analysis: outcome.analysis(),
        timeline,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn analyze_from<S>(
    analyzer: &Analyzer,
    source: &S,
    request: &AnalyzeRequest<'_>,
) -> (AnalysisOutcome, Option<Vec<BrandTally>>)
where
    S: CatalogSource + Sync,
{
    let outcome = analyzer
        .analyze_response(source, request.organization_id, request.response_text)
        .await;
    if !request.timeline {
        return (outcome, None);
    }

    let timeline = match source.fetch_catalog(request.organization_id).await {
        Ok(catalog) => analyzer.mention_timeline(&catalog, request.response_text),
        Err(e) => {
            tracing::warn!(error = %e, "catalog lookup failed; empty timeline");
            Vec::new()
        }
    };
    (outcome, Some(timeline))
}

async fn persist(
    pool: &sqlx::PgPool,
    request: &AnalyzeRequest<'_>,
    outcome: &AnalysisOutcome,
) -> anyhow::Result<i64> {
    let organization_id = aivis_db::parse_organization_id(request.organization_id)?;
    let id = aivis_db::insert_brand_analysis(
        pool,
        NewBrandAnalysis {
            organization_id,
            prompt_id: request.prompt_id,
            provider: request.provider,
            outcome,
        },
    )
    .await?;
    Ok(id)
}
