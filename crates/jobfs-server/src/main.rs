use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use jobfs_core::config::JobfsConfig;
use jobfs_server::app::AppState;
use jobfs_server::conn;
use jobfs_server::defs::{self, DefinitionsLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobfs_server=info".into()),
        )
        .init();

    // config: explicit path via JOBFS_CONFIG > ~/.jobfs/jobfs.toml
    let config_path = std::env::var("JOBFS_CONFIG").ok();
    let config = JobfsConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("config load failed ({e}), using defaults");
        JobfsConfig::default()
    });

    let definitions = DefinitionsLog::open(&config.definitions.path).await?;
    info!(path = %config.definitions.path, "definitions log open");

    let bind = config.server.bind.clone();
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, definitions)?);

    // Restore persisted jobs (stopped) before accepting connections.
    defs::replay(&state.registry, &state.definitions).await?;

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "jobfs listening");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "accepted connection");
                        let app = Arc::clone(&state);
                        tokio::spawn(conn::run_connection(stream, app));
                    }
                    Err(e) => warn!("accept failed: {e}"),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    // Stop every started job so scheduler tasks exit cleanly and their
    // completion entries land before the process does.
    for job in state.registry.jobs() {
        job.stop().await;
    }
    info!("shutdown complete");
    Ok(())
}

/// Resolve when SIGTERM or SIGINT arrives.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = sigterm.recv() => info!("SIGTERM received, shutting down"),
            _ = tokio::signal::ctrl_c() => info!("SIGINT received, shutting down"),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("interrupt received, shutting down");
    }
}
