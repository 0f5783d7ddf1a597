mod analyses;
mod analyze;

use std::sync::Arc;

use aivis_core::BrandCatalogEntry;
use aivis_db::{DbError, PgCatalog};
use aivis_detect::{Analyzer, CatalogSource, StaticCatalog};
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
    REQUEST_ID_HEADER,
};

/// Where the server reads brand catalogs from.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    /// Catalogs loaded once from the YAML file at startup.
    File(Arc<StaticCatalog>),
    /// The `brand_catalog` table, read per request.
    Postgres(PgCatalog),
}

impl CatalogBackend {
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl CatalogSource for CatalogBackend {
    type Error = DbError;

    async fn fetch_catalog(&self, organization_id: &str) -> Result<Vec<BrandCatalogEntry>, DbError> {
        match self {
            Self::File(catalog) => Ok(catalog
                .fetch_catalog(organization_id)
                .await
                .unwrap_or_else(|never| match never {})),
            Self::Postgres(catalog) => catalog.fetch_catalog(organization_id).await,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Absent when no `DATABASE_URL` is configured; persistence and history
    /// are then unavailable.
    pub pool: Option<PgPool>,
    pub catalog: CatalogBackend,
    pub analyzer: Arc<Analyzer>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    catalog: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "database_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::InvalidOrganizationId(raw) => ApiError::new(
            request_id,
            "validation_error",
            format!("organization id '{raw}' is not a UUID"),
        ),
        _ => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

pub(super) fn require_pool(state: &AppState, request_id: &str) -> Result<PgPool, ApiError> {
    state.pool.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "database_unavailable",
            "no database is configured for this server",
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze", post(analyze::analyze_response))
        .route(
            "/api/v1/organizations/{org_id}/analyses",
            get(analyses::list_analyses),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let catalog = state.catalog.label();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "disabled",
                    catalog,
                },
                meta,
            }),
        );
    };

    match aivis_db::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    catalog,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        catalog,
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    pub(crate) fn file_state() -> AppState {
        let catalog = StaticCatalog::new().with_organization(
            "acme",
            vec![
                BrandCatalogEntry::org_brand("Acme").with_variants(["Acme Corp"]),
                BrandCatalogEntry::competitor("Globex"),
                BrandCatalogEntry::competitor("Initech"),
            ],
        );
        AppState {
            pool: None,
            catalog: CatalogBackend::File(Arc::new(catalog)),
            analyzer: Arc::new(Analyzer::default()),
        }
    }

    pub(crate) fn app(state: AppState) -> Router {
        build_app(state, AuthState::disabled(), default_rate_limit_state())
    }

    pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    pub(crate) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }
}
