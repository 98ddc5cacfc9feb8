//! anonircd - Anonymous IRC Daemon

use anonircd::config::ConfigHandle;
use anonircd::db::Database;
use anonircd::network::Gateway;
use anonircd::security::{BanStore, MemoryBanStore, SqliteBanStore};
use anonircd::state::{Anonymizer, Matrix};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often expired bans are pruned.
const BAN_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "anonircd.toml".to_string());

    let handle = ConfigHandle::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    let config = handle.current();

    info!(
        server = %config.server.name,
        network = %config.server.network,
        "Starting anonircd"
    );

    // Bans: SQLite when configured, otherwise in memory for this run only
    let db = match &config.database {
        Some(db_config) => Some(Database::new(&db_config.path).await?),
        None => {
            warn!("No [database] configured, D-lines will not survive a restart");
            None
        }
    };
    let bans: Arc<dyn BanStore> = match &db {
        Some(db) => Arc::new(SqliteBanStore::open(db.clone()).await?),
        None => Arc::new(MemoryBanStore::new()),
    };

    let anonymizer = Anonymizer::from_entropy(&config.anonymity);
    let matrix = Arc::new(Matrix::new(handle, bans, anonymizer));

    // Start ban pruning task
    {
        let matrix = Arc::clone(&matrix);
        let shutdown = matrix.lifecycle.shutdown_token().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(BAN_PRUNE_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = matrix.bans.reload().await {
                            warn!(error = %e, "Failed to prune expired bans");
                        }
                    }
                }
            }
        });
    }

    spawn_reload_on_sighup(Arc::clone(&matrix));

    let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix)).await?;
    let gateway_task = tokio::spawn(gateway.run());

    wait_for_shutdown_signal().await;
    matrix.shutdown().await;

    match gateway_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Gateway failed"),
        Err(e) => error!(error = %e, "Gateway task panicked"),
    }
    if let Some(db) = db {
        db.close().await;
    }
    info!("anonircd stopped");
    Ok(())
}

#[cfg(unix)]
fn spawn_reload_on_sighup(matrix: Arc<Matrix>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "SIGHUP handler unavailable, reload only via REHASH");
            return;
        }
    };
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading");
            if let Err(e) = matrix.reload().await {
                error!(error = %e, "Reload failed, keeping running configuration");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_sighup(_matrix: Arc<Matrix>) {}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
