use anyhow::Context;
use clap::Parser;
use entity_cluster::cluster::HttpNodeClient;
use entity_cluster::config::{Cli, LogFormat, NodeConfig};
use entity_cluster::server::{NodeService, router};
use entity_cluster::storage::{DiskEngine, MemoryEngine, StorageEngine};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::from_cli(Cli::parse()).context("invalid cluster topology")?;

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(&config.log_level)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(&config.log_level)
            .init(),
    }

    tracing::info!("Starting node {} on {}", config.topology.local(), config.bind);
    tracing::info!(
        "Topology ({} nodes): {}",
        config.topology.len(),
        config
            .topology
            .nodes()
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // 1. Peer client:
    let client = HttpNodeClient::new(config.peer_timeout).context("failed to build peer client")?;

    // 2. Storage and coordinator:
    let engine: Arc<dyn StorageEngine> = match &config.data_dir {
        Some(dir) => Arc::new(
            DiskEngine::open(dir)
                .with_context(|| format!("failed to open data dir {}", dir.display()))?,
        ),
        None => {
            tracing::warn!("No --data-dir given, records are kept in memory only");
            Arc::new(MemoryEngine::new())
        }
    };
    let service = NodeService::new(
        config.topology,
        engine,
        client,
        config.reconciliation,
    );

    // 3. HTTP server:
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    service.lifecycle().start();

    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.lifecycle().stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
