use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use board_core::{Board, BoardStore, ClaimEngine, HistoryCompactor};
use board_persistence::{BoardRepository, connection::connect_and_migrate};
use board_server::{config::Config, create_routes};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting points board server...");

    if let Err(err) = run().await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to read configuration")?;
    let addr = config.bind_address()?;

    // Initialize database connection and run migrations
    let db = connect_and_migrate(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    let store: Arc<dyn BoardStore> = Arc::new(BoardRepository::new(db));

    let claims = ClaimEngine::new(store.clone()).with_max_retries(config.claim_max_retries);
    let board = Arc::new(
        Board::with_claim_engine(store.clone(), claims).with_history_limit(config.history_limit),
    );

    if config.seed_sample_users {
        board
            .seed_sample_users()
            .await
            .context("Failed to seed sample users")?;
    }

    if let Some(retain) = config.history_retention {
        info!(
            "Claim history retention set to {} records, compacting every {}s",
            retain, config.compaction_interval_seconds
        );
        spawn_history_compaction(
            store.clone(),
            HistoryCompactor::new(retain),
            Duration::from_secs(config.compaction_interval_seconds),
        );
    }

    let routes = create_routes(board);

    info!("Server starting on {}", addr);

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}

fn spawn_history_compaction(
    store: Arc<dyn BoardStore>,
    compactor: HistoryCompactor,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(err) = compactor.run(store.as_ref()).await {
                error!("History compaction failed: {}", err);
            }
        }
    });
}

async fn shutdown_signal() {
    // Wait for SIGINT (Ctrl+C) or SIGTERM
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                (Err(err), _) | (_, Err(err)) => {
                    error!("Failed to install signal handlers: {}", err);
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", err);
            return std::future::pending().await;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
    }
}
