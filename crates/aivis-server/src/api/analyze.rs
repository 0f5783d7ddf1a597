use aivis_db::NewBrandAnalysis;
use aivis_detect::BrandAnalysis;
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, require_pool, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub response_text: String,
    pub prompt_id: Option<String>,
    pub provider: Option<String>,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: BrandAnalysis,
    /// `analyzed`, or the reason the safe default was returned.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
}

/// Analyze one assistant response for an organization.
///
/// Analysis never fails: catalog problems produce the safe default with a
/// fallback `outcome`. Only an empty organization id, or a persistence
/// request that cannot be honored, produces an error.
pub(super) async fn analyze_response(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeResponse>>, ApiError> {
    let organization_id = request.organization_id.trim();
    if organization_id.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "organizationId must be non-empty",
        ));
    }

    let outcome = state
        .analyzer
        .analyze_response(&state.catalog, organization_id, &request.response_text)
        .await;

    let analysis_id = if request.persist {
        let pool = require_pool(&state, &req_id.0)?;
        let organization_id = aivis_db::parse_organization_id(organization_id)
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        let id = aivis_db::insert_brand_analysis(
            &pool,
            NewBrandAnalysis {
                organization_id,
                prompt_id: request.prompt_id.as_deref(),
                provider: request.provider.as_deref(),
                outcome: &outcome,
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        Some(id)
    } else {
        None
    };

    let outcome_label = outcome.label();
    Ok(Json(ApiResponse {
        data: AnalyzeResponse {
            analysis: outcome.into_analysis(),
            outcome: outcome_label,
            analysis_id,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aivis_core::BrandCatalogEntry;
    use aivis_db::PgCatalog;
    use aivis_detect::Analyzer;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use super::super::test_support::{app, file_state, get, post_json, send};
    use super::super::CatalogBackend;
    use super::*;

    #[tokio::test]
    async fn analyzes_rank_one_response() {
        let (status, json) = send(
            app(file_state()),
            post_json(
                "/api/v1/analyze",
                &json!({
                    "organizationId": "acme",
                    "responseText": "Acme is the best tool, better than Globex and Initech."
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["orgBrandPresent"], true);
        assert_eq!(data["orgBrandProminence"], 1);
        assert_eq!(data["brands"], json!(["Acme"]));
        assert_eq!(data["competitors"], json!(["Globex", "Initech"]));
        assert_eq!(data["outcome"], "analyzed");
        assert!(data["score"].as_f64().expect("score") >= 8.0);
        assert!(data.get("analysisId").is_none());
    }

    #[tokio::test]
    async fn unknown_organization_returns_safe_default_with_ok_status() {
        let (status, json) = send(
            app(file_state()),
            post_json(
                "/api/v1/analyze",
                &json!({"organizationId": "hooli", "responseText": "Acme and Globex."}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["score"], 1.0);
        assert_eq!(json["data"]["orgBrandPresent"], false);
        assert!(json["data"]["orgBrandProminence"].is_null());
        assert_eq!(json["data"]["outcome"], "no_catalog");
    }

    #[tokio::test]
    async fn empty_organization_id_is_rejected() {
        let (status, json) = send(
            app(file_state()),
            post_json(
                "/api/v1/analyze",
                &json!({"organizationId": "  ", "responseText": "Acme"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn missing_response_text_is_analyzed_as_empty() {
        let (status, json) = send(
            app(file_state()),
            post_json("/api/v1/analyze", &json!({"organizationId": "acme"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "analyzed");
        assert_eq!(json["data"]["score"], 2.0);
    }

    #[tokio::test]
    async fn persist_without_database_is_unavailable() {
        let (status, json) = send(
            app(file_state()),
            post_json(
                "/api/v1/analyze",
                &json!({"organizationId": "acme", "responseText": "Acme", "persist": true}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "database_unavailable");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn persisted_analysis_shows_up_in_history(pool: sqlx::PgPool) {
        let org_id = Uuid::new_v4();
        aivis_db::insert_organization(&pool, org_id, "Acme")
            .await
            .expect("organization");
        for entry in [
            BrandCatalogEntry::org_brand("Acme"),
            BrandCatalogEntry::competitor("Globex"),
        ] {
            aivis_db::insert_catalog_entry(&pool, org_id, &entry)
                .await
                .expect("catalog entry");
        }
        let state = AppState {
            catalog: CatalogBackend::Postgres(PgCatalog::new(pool.clone())),
            pool: Some(pool),
            analyzer: Arc::new(Analyzer::default()),
        };

        let (status, json) = send(
            app(state.clone()),
            post_json(
                "/api/v1/analyze",
                &json!({
                    "organizationId": org_id.to_string(),
                    "responseText": "Globex first, then Acme.",
                    "promptId": "prompt-7",
                    "provider": "openai",
                    "persist": true
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["orgBrandProminence"], 2);
        assert!(json["data"]["analysisId"].is_i64());

        let (status, json) = send(
            app(state),
            get(&format!("/api/v1/organizations/{org_id}/analyses")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = json["data"].as_array().expect("data array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["promptId"], "prompt-7");
        assert_eq!(rows[0]["provider"], "openai");
        assert_eq!(rows[0]["competitors"], json!(["Globex"]));
        assert_eq!(rows[0]["outcome"], "analyzed");
    }
}
