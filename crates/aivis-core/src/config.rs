use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, ScoringPolicy};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

    let env = parse_environment(&or_default("AIVIS_ENV", "development"));

    let bind_addr = or_default("AIVIS_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("AIVIS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("AIVIS_CATALOG_PATH", "./config/catalog.yaml"));

    let scoring_policy = or_default("AIVIS_SCORING_POLICY", "graduated")
        .parse::<ScoringPolicy>()
        .map_err(|reason| invalid("AIVIS_SCORING_POLICY", reason))?;
    let competitor_keywords = parse_keyword_list(&or_default("AIVIS_COMPETITOR_KEYWORDS", ""));

    let db_max_connections = parse_u32("AIVIS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AIVIS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AIVIS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        scoring_policy,
        competitor_keywords,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Split a comma-separated list, trimming entries and dropping empties and
/// case-insensitive duplicates.
fn parse_keyword_list(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(ToOwned::to_owned)
        .collect()
}
