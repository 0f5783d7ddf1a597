mod api;
mod middleware;

use std::sync::Arc;

use aivis_detect::{Analyzer, StaticCatalog};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState, CatalogBackend},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = aivis_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = match config.database_url.as_deref() {
        Some(_) => {
            let pool = aivis_db::connect_pool_from_config(&config).await?;
            let applied = aivis_db::run_migrations(&pool).await?;
            tracing::info!(applied, "database ready");
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; serving catalogs from file without persistence");
            None
        }
    };

    let catalog = match &pool {
        Some(pool) => CatalogBackend::Postgres(aivis_db::PgCatalog::new(pool.clone())),
        None => {
            let file = aivis_core::load_catalog(&config.catalog_path)?;
            tracing::info!(
                path = %config.catalog_path.display(),
                organizations = file.organizations.len(),
                "loaded brand catalog file"
            );
            CatalogBackend::File(Arc::new(StaticCatalog::from(file)))
        }
    };

    let analyzer = Arc::new(Analyzer::from_config(&config));
    tracing::info!(policy = %analyzer.policy(), "brand analyzer configured");

    let auth = AuthState::from_env(matches!(config.env, aivis_core::Environment::Development))?;
    let app = build_app(
        AppState {
            pool,
            catalog,
            analyzer,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
