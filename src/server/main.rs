//! Cartographer API server.
//!
//! Serves read-only POI and zone listings from PostGIS, or from a JSON
//! fixture file when `--fixtures` is given.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cartographer::config::Config;
use cartographer::http::{build_router, AppState};
use cartographer::store::{MemoryStore, PgStore, SpatialStore};

#[derive(Parser, Debug)]
#[command(name = "cartographer-server")]
#[command(about = "Cartographer API: POI and zone queries")]
struct Args {
    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// PostgreSQL connection URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve rows from a JSON fixture file instead of PostgreSQL
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }

    info!("Cartographer API");

    let store: Arc<dyn SpatialStore> = match &args.fixtures {
        Some(path) => {
            info!("Loading fixtures from {:?}", path);
            let store = MemoryStore::load(path).context("Failed to load fixtures")?;
            Arc::new(store)
        }
        None => {
            let url = config
                .database
                .url
                .as_deref()
                .context("No database URL: pass --database-url, set DATABASE_URL or [database] url")?;
            info!(
                "Connecting to PostgreSQL (max {} connections)",
                config.database.max_connections
            );
            let store = PgStore::connect(
                url,
                config.database.max_connections,
                Duration::from_secs(config.database.acquire_timeout_secs),
            )
            .await
            .context("Failed to connect to PostgreSQL")?;

            if !store.health_check().await {
                anyhow::bail!("PostgreSQL is not answering queries");
            }
            Arc::new(store)
        }
    };

    let state = Arc::new(AppState::new(store, config.pagination));
    let app = build_router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
