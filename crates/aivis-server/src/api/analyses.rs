use aivis_db::BrandAnalysisRow;
use aivis_detect::BrandAnalysis;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, require_pool, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalysisHistoryItem {
    pub id: i64,
    pub prompt_id: Option<String>,
    pub provider: Option<String>,
    #[serde(flatten)]
    pub analysis: BrandAnalysis,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}

impl From<BrandAnalysisRow> for AnalysisHistoryItem {
    fn from(row: BrandAnalysisRow) -> Self {
        Self {
            analysis: row.to_analysis(),
            id: row.id,
            prompt_id: row.prompt_id,
            provider: row.provider,
            outcome: row.outcome,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalysesQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_analyses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(org_id): Path<String>,
    Query(query): Query<AnalysesQuery>,
) -> Result<Json<ApiResponse<Vec<AnalysisHistoryItem>>>, ApiError> {
    let pool = require_pool(&state, &req_id.0)?;
    let organization_id =
        aivis_db::parse_organization_id(&org_id).map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let rows = aivis_db::list_brand_analyses(&pool, organization_id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(AnalysisHistoryItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
