//! Offline unit tests for aivis-db pool configuration and row types.
//! These tests do not require a live database connection.

use aivis_core::{AppConfig, Environment, ScoringPolicy};
use aivis_db::{BrandAnalysisRow, BrandCatalogRow, DbError, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

fn app_config(database_url: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: database_url.map(str::to_string),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        scoring_policy: ScoringPolicy::Graduated,
        competitor_keywords: Vec::new(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config(Some("postgres://example")));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_database_url_is_reported() {
    let err = aivis_db::connect_pool_from_config(&app_config(None))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::MissingDatabaseUrl));
}

/// Compile-time smoke test: confirm that [`BrandCatalogRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn brand_catalog_row_has_expected_fields() {
    let row = BrandCatalogRow {
        id: 3_i64,
        organization_id: uuid::Uuid::new_v4(),
        name: "Globex".to_string(),
        variants: serde_json::json!(["Globex Corporation"]),
        is_org_brand: false,
    };

    let entry = row.into_entry();
    assert_eq!(entry.name, "Globex");
    assert!(!entry.is_org_brand);
    assert_eq!(entry.variants, vec!["Globex Corporation"]);
}

/// Compile-time smoke test: confirm that [`BrandAnalysisRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn brand_analysis_row_for_fallback_rebuilds_safe_default() {
    use chrono::Utc;
    use rust_decimal::Decimal;

    let row = BrandAnalysisRow {
        id: 9_i64,
        organization_id: uuid::Uuid::new_v4(),
        prompt_id: None,
        provider: Some("openai".to_string()),
        score: Decimal::ONE,
        org_brand_present: false,
        org_brand_prominence: None,
        brands: serde_json::json!([]),
        competitors: serde_json::json!([]),
        outcome: "no_catalog".to_string(),
        created_at: Utc::now(),
    };

    assert_eq!(row.to_analysis(), aivis_detect::BrandAnalysis::safe_default());
    assert_eq!(row.outcome, "no_catalog");
}
