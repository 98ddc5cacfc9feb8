//! Gateway - the TCP listener.
//!
//! Accepts connections, checks the remote address against the ban store
//! before a single byte of protocol is written, and hands survivors to a
//! [`Connection`] task tracked by the lifecycle manager.

use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::{Matrix, closing_link};
use anonirc_proto::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

/// How long a refused peer gets to receive its ERROR line.
const REFUSAL_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// The Gateway accepts incoming connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Gateway {
    /// Bind the listener.
    pub async fn bind(addr: SocketAddr, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listener bound");

        Ok(Self {
            listener,
            matrix,
            registry: Arc::new(Registry::new()),
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until shutdown begins.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.matrix.lifecycle.shutdown_token();

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Gateway stopped accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => {
                    let matrix = Arc::clone(&self.matrix);
                    let registry = Arc::clone(&self.registry);
                    self.matrix
                        .lifecycle
                        .tracker()
                        .spawn(handle_client(stream, addr, matrix, registry));
                }
                Err(e) => {
                    // EMFILE and friends: back off instead of spinning
                    error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

async fn handle_client(
    mut stream: TcpStream,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
) {
    if let Some(reason) = admission_refusal(&matrix, addr).await {
        refuse(&mut stream, closing_link(addr, &reason)).await;
        return;
    }

    info!(%addr, "Connection accepted");
    if let Err(e) = Connection::new(stream, addr, matrix, registry).run().await {
        error!(%addr, error = %e, "Connection error");
    }
}

/// `Some(reason)` if the address must be turned away.
async fn admission_refusal(matrix: &Matrix, addr: SocketAddr) -> Option<String> {
    match matrix.bans.is_banned(addr.ip()).await {
        Ok(None) => None,
        Ok(Some(ban)) => {
            warn!(%addr, mask = %ban.mask, reason = %ban.reason(), "Connection rejected - address banned");
            Some(format!("Banned: {}", ban.reason()))
        }
        Err(e) if matrix.config.current().bans.fail_open => {
            warn!(%addr, error = %e, "Ban store unavailable, admitting connection");
            None
        }
        Err(e) => {
            error!(%addr, error = %e, "Ban store unavailable, refusing connection");
            Some("Ban check unavailable".to_string())
        }
    }
}

/// Write a single line straight to the socket and close it.
async fn refuse(stream: &mut TcpStream, msg: Message) {
    let line = format!("{msg}\r\n");
    let write = async {
        stream.write_all(line.as_bytes()).await?;
        stream.shutdown().await
    };
    if let Err(e) = tokio::time::timeout(REFUSAL_WRITE_TIMEOUT, write)
        .await
        .unwrap_or_else(|_| Err(std::io::ErrorKind::TimedOut.into()))
    {
        debug!(error = %e, "Refusal write failed");
    }
}
