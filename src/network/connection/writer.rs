//! Writer task: drains the session's outbound queue onto the socket.

use crate::state::Session;
use anonirc_proto::{IrcCodec, Message, ProtocolError};
use futures_util::SinkExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tracing::{debug, warn};

type Sink = FramedWrite<OwnedWriteHalf, IrcCodec>;

/// Write queued messages until the session is cancelled, then flush what
/// is already queued (a final ERROR line, typically) and close the socket.
pub(super) async fn run(
    mut sink: Sink,
    mut rx: mpsc::Receiver<Arc<Message>>,
    session: Arc<Session>,
    write_timeout: Duration,
) {
    let cancel = session.cancel_token().clone();

    loop {
        let msg = tokio::select! {
            biased;
            msg = rx.recv() => msg,
            _ = cancel.cancelled() => break,
        };
        let Some(msg) = msg else { break };

        if let Err(reason) = write_one(&mut sink, msg, write_timeout).await {
            session.request_close(&reason);
            rx.close();
            return;
        }
    }

    rx.close();
    let mut flushed = 0usize;
    while let Ok(msg) = rx.try_recv() {
        if write_one(&mut sink, msg, write_timeout).await.is_err() {
            break;
        }
        flushed += 1;
    }
    if flushed > 0 {
        debug!(flushed, "Flushed queued messages on close");
    }

    let _ = tokio::time::timeout(write_timeout, sink.get_mut().shutdown()).await;
}

/// `Err(reason)` means the socket is unusable and the session must close.
async fn write_one(sink: &mut Sink, msg: Arc<Message>, write_timeout: Duration) -> Result<(), String> {
    match tokio::time::timeout(write_timeout, sink.send(msg)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(ProtocolError::Io(e))) => {
            debug!(error = %e, "Write error");
            Err(format!("Write error: {e}"))
        }
        Ok(Err(e)) => {
            // unencodable message: drop it, keep the connection
            warn!(error = %e, "Dropped outgoing message");
            Ok(())
        }
        Err(_) => {
            warn!(timeout = ?write_timeout, "Write timed out");
            Err("Write timeout".to_string())
        }
    }
}
