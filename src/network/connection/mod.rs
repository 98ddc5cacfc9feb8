//! Connection - Handles an individual client connection.
//!
//! Each Connection owns two tasks:
//!
//! ```text
//!   socket read half                         socket write half
//!         │                                         ▲
//!   FramedRead<IrcCodec>                    FramedWrite<IrcCodec>
//!         │                                         │
//!   event loop ── Registry::dispatch ──▶ mpsc queue ─┘  (writer task)
//!         │                                 ▲
//!         └── timers (registration, PING)   └── fan-out from other sessions
//! ```
//!
//! The reader runs in the connection task itself; the writer is spawned on
//! the lifecycle tracker so shutdown can wait for it to flush. Both stop
//! when the session's cancellation token fires.

mod error_handling;
mod event_loop;
mod writer;

use crate::handlers::Registry;
use crate::state::{Matrix, Session};
use anonirc_proto::IrcCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, error, info_span, warn};

/// A client connection handler.
pub struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            stream,
            addr,
            matrix,
            registry,
        }
    }

    /// Run the connection until the client leaves or the session is closed.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            stream,
            addr,
            matrix,
            registry,
        } = self;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
        }

        let config = matrix.config.current();
        let (session, rx) = matrix.attach_session(addr);
        let span = info_span!("connection", session = %session.id, %addr);

        let (read_half, write_half) = stream.into_split();
        let sink = FramedWrite::new(write_half, IrcCodec::new(config.limits.max_line_len));
        let writer = matrix.lifecycle.tracker().spawn(
            writer::run(
                sink,
                rx,
                Arc::clone(&session),
                config.limits.write_timeout(),
            )
            .instrument(span.clone()),
        );

        let teardown = Teardown {
            matrix: &matrix,
            session: &session,
        };
        let mut reader = FramedRead::new(read_half, IrcCodec::new(config.limits.max_line_len));
        event_loop::run(&mut reader, &matrix, &registry, &session, &config.limits)
            .instrument(span.clone())
            .await;
        span.in_scope(|| drop(teardown));

        if let Err(e) = writer.await {
            warn!(%addr, error = %e, "Writer task failed");
        }
        Ok(())
    }
}

/// Runs the close routine when the read side ends, including when a
/// handler panics and the task unwinds.
struct Teardown<'a> {
    matrix: &'a Matrix,
    session: &'a Arc<Session>,
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        let reason = match self.session.close_reason() {
            Some(reason) => reason,
            None if std::thread::panicking() => "Internal error".to_string(),
            None => "Connection closed".to_string(),
        };
        if std::thread::panicking() {
            error!(session = %self.session.id, "Connection task panicked");
        }
        self.matrix.close_session(self.session.id, &reason);
    }
}
