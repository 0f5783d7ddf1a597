mod analyze;
mod catalog;
mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aivis-cli")]
#[command(about = "Brand visibility analysis for AI assistant responses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one response text for an organization and print the result as JSON
    Analyze {
        /// Organization whose catalog is used
        #[arg(long)]
        org: String,

        /// Response text to analyze
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the response text from a file instead
        #[arg(long)]
        file: Option<PathBuf>,

        /// Where to read the organization's brand catalog from
        #[arg(long, value_enum, default_value_t = SourceKind::Yaml)]
        source: SourceKind,

        /// Store the result in `brand_analyses`
        #[arg(long)]
        persist: bool,

        /// Prompt the response answered, stored with a persisted result
        #[arg(long)]
        prompt_id: Option<String>,

        /// Assistant that produced the response, stored with a persisted result
        #[arg(long)]
        provider: Option<String>,

        /// Also print each mentioned brand's first position and mention count
        #[arg(long)]
        timeline: bool,
    },
    /// Brand catalog maintenance
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Show recently stored analyses for an organization
    History {
        /// Organization UUID
        #[arg(long)]
        org: String,

        /// Maximum number of rows to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommands {
    /// Validate a catalog file and summarize it
    Check {
        /// Catalog file; defaults to `AIVIS_CATALOG_PATH`
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Load a catalog file into the database (organization ids must be UUIDs)
    Import {
        /// Catalog file; defaults to `AIVIS_CATALOG_PATH`
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// The YAML catalog file at `AIVIS_CATALOG_PATH`
    Yaml,
    /// The `brand_catalog` table
    Db,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &aivis_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = aivis_db::connect_pool_from_config(config).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = aivis_core::load_app_config_from_env()?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Analyze {
            org,
            text,
            file,
            source,
            persist,
            prompt_id,
            provider,
            timeline,
        }) => {
            let text = analyze::read_response_text(text, file.as_deref())?;
            let request = analyze::AnalyzeRequest {
                organization_id: &org,
                response_text: &text,
                source,
                persist,
                prompt_id: prompt_id.as_deref(),
                provider: provider.as_deref(),
                timeline,
            };
            analyze::run_analyze(&config, request).await?;
        }
        Some(Commands::Catalog { command }) => match command {
            CatalogCommands::Check { path } => {
                let path = path.unwrap_or_else(|| config.catalog_path.clone());
                catalog::run_catalog_check(&path)?;
            }
            CatalogCommands::Import { path } => {
                let path = path.unwrap_or_else(|| config.catalog_path.clone());
                let pool = connect(&config).await?;
                catalog::run_catalog_import(&pool, &path).await?;
            }
        },
        Some(Commands::Db { command }) => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    aivis_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = aivis_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Some(Commands::History { org, limit }) => {
            let pool = connect(&config).await?;
            history::run_history(&pool, &org, limit).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
