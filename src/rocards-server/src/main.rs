//! rocards API Server
//!
//! Serves the card catalog, randomized draws and per-user collections.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rocards::{Catalog, DrawEngine};
use rocards_ledger::{CollectionLedger, CollectionRepository, LedgerDb};
use rocards_server::config::{self, Cli, Command, ServerConfig};
use rocards_server::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = config::load_dotenv()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            // Initialize tracing
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        "rocards_server=info,rocards_ledger=info,tower_http=debug".into()
                    }),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            if let Some(path) = env_file {
                tracing::info!("Loaded environment from {}", path.display());
            }

            serve(ServerConfig::from(args)).await?;
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.cards)
        .with_context(|| format!("Failed to load card catalog from {}", config.cards.display()))?;
    tracing::info!(
        cards = catalog.len(),
        rare = catalog.rare().len(),
        normal = catalog.normal().len(),
        "Catalog loaded"
    );

    let engine = DrawEngine::new(Arc::new(catalog), config.rare_rate)
        .context("Invalid draw configuration")?;

    let db = LedgerDb::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.init().await.context("Failed to run migrations")?;
    tracing::info!("Database initialized ({})", db.backend());

    let state = Arc::new(AppState::new(
        engine,
        CollectionLedger::new(db),
        config.max_pack_size,
    ));
    let app = rocards_server::router(state, &config);

    let bind_addr = config.bind_addr();
    tracing::info!("Starting server on {}", bind_addr);
    tracing::info!("OpenAPI spec available at /openapi.json");
    tracing::info!("Interactive docs at /scalar");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
