//! Database operations for the `brand_analyses` table.

use aivis_detect::{AnalysisOutcome, BrandAnalysis};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upper bound on rows returned by [`list_brand_analyses`].
pub const MAX_HISTORY_LIMIT: i64 = 500;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `brand_analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandAnalysisRow {
    pub id: i64,
    pub organization_id: Uuid,
    pub prompt_id: Option<String>,
    pub provider: Option<String>,
    pub score: Decimal,
    pub org_brand_present: bool,
    pub org_brand_prominence: Option<i32>,
    pub brands: Value,
    pub competitors: Value,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}

impl BrandAnalysisRow {
    /// Rebuild the analysis record stored in this row.
    #[must_use]
    pub fn to_analysis(&self) -> BrandAnalysis {
        BrandAnalysis {
            score: self.score.to_f64().unwrap_or_default(),
            org_brand_present: self.org_brand_present,
            org_brand_prominence: self
                .org_brand_prominence
                .and_then(|rank| u32::try_from(rank).ok()),
            brands: string_list(&self.brands),
            competitors: string_list(&self.competitors),
        }
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// One analysis to persist, with the prompt/provider context it came from.
#[derive(Debug, Clone, Copy)]
pub struct NewBrandAnalysis<'a> {
    pub organization_id: Uuid,
    pub prompt_id: Option<&'a str>,
    pub provider: Option<&'a str>,
    pub outcome: &'a AnalysisOutcome,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert an analysis outcome and return its generated id.
///
/// The score is stored as `NUMERIC(3,1)`; the outcome label records whether
/// the row is a real analysis or a fallback.
///
/// # Errors
///
/// Returns [`DbError::InvalidScore`] if the score is not finite, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_brand_analysis(
    pool: &PgPool,
    new: NewBrandAnalysis<'_>,
) -> Result<i64, DbError> {
    let analysis = new.outcome.analysis();
    let score = Decimal::from_f64(analysis.score)
        .ok_or(DbError::InvalidScore(analysis.score))?
        .round_dp(1);
    let prominence = analysis
        .org_brand_prominence
        .map(i32::try_from)
        .transpose()
        .map_err(|_| DbError::InvalidScore(analysis.score))?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO brand_analyses \
             (organization_id, prompt_id, provider, score, org_brand_present, \
              org_brand_prominence, brands, competitors, outcome) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(new.organization_id)
    .bind(new.prompt_id)
    .bind(new.provider)
    .bind(score)
    .bind(analysis.org_brand_present)
    .bind(prominence)
    .bind(Value::from(analysis.brands.clone()))
    .bind(Value::from(analysis.competitors.clone()))
    .bind(new.outcome.label())
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        id,
        organization_id = %new.organization_id,
        outcome = %new.outcome.label(),
        "stored brand analysis"
    );

    Ok(id)
}

/// Returns the most recent analyses for an organization, newest first.
///
/// `limit` is clamped to `1..=MAX_HISTORY_LIMIT`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brand_analyses(
    pool: &PgPool,
    organization_id: Uuid,
    limit: i64,
) -> Result<Vec<BrandAnalysisRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandAnalysisRow>(
        "SELECT id, organization_id, prompt_id, provider, score, org_brand_present, \
                org_brand_prominence, brands, competitors, outcome, created_at \
         FROM brand_analyses \
         WHERE organization_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(organization_id)
    .bind(limit.clamp(1, MAX_HISTORY_LIMIT))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
