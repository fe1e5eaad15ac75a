use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use echolingo_config::{Config, StorageBackend};
use echolingo_lookup::{CompletionProvider, Lookup, OpenAiProvider, RetryPolicy};
use echolingo_store::{LexiconStore, MemoryStore, RemoteStore, SqliteStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;


use self::state::AppState;

/// Dictionary and idiom lookup service with Anki export
#[derive(Parser)]
#[command(name = "echolingo")]
struct Args {
    /// Listen address override, host:port
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::new();

    // Backend choice is explicit configuration, resolved exactly once
    let store: Arc<dyn LexiconStore> = match config.storage.backend {
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.storage.sqlite_path, "using sqlite store");
            Arc::new(SqliteStore::open(&config.storage.sqlite_path)?)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory store; saved entries will not survive a restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Remote => {
            tracing::info!(url = %config.storage.remote_url, "using remote store");
            Arc::new(RemoteStore::new(
                config.storage.remote_url.clone(),
                config.storage.remote_token.clone(),
            ))
        }
    };

    // Idempotent, runs before the first request is accepted
    store.migrate().await?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(
        config.provider.api_key.clone(),
        config.provider.api_url.clone(),
        config.provider.model.clone(),
        Duration::from_secs(config.provider.timeout_seconds),
    )?);
    let metadata = provider.metadata();
    tracing::info!(
        model = %metadata.name,
        requires_api_key = metadata.requires_api_key,
        "completion provider ready"
    );

    let lookup = Arc::new(Lookup::new(Arc::clone(&provider)));
    let batch_lookup = Arc::new(Lookup::with_retry(provider, RetryPolicy::batch()));

    let app = routes::router(AppState {
        store,
        lookup,
        batch_lookup,
    });

    let listen = args.listen.unwrap_or(config.server.listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!(%listen, "echolingo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl+c");
        return;
    }
    tracing::info!("shutdown requested");
}
