//! Per-connection session record.
//!
//! A [`Session`] is created when a socket is accepted and lives until its
//! connection task calls [`crate::state::Matrix::close_session`]. The record
//! owns the outbound queue sender and the cancellation token for the
//! connection; everything mutable sits behind one short-lived mutex.

use anonirc_proto::Message;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

/// Process-unique connection identifier. Never shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection lifecycle.
///
/// `Connected -> Registering -> Active -> Closing -> Closed`; any state may
/// jump straight to `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Socket accepted, nothing received yet.
    #[default]
    Connected,
    /// NICK or USER seen, but not both.
    Registering,
    /// Welcome burst sent.
    Active,
    Closing,
    Closed,
}

/// Outcome of a non-blocking delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The send queue is full; the caller should close the session.
    Full,
    /// The writer is gone.
    Closed,
}

/// The session's queue no longer accepts messages.
#[derive(Debug, Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Mutable part of a session.
#[derive(Debug, Default)]
pub struct SessionData {
    pub state: SessionState,
    pub nick: Option<String>,
    pub user: Option<String>,
    pub realname: Option<String>,
    /// Casefolded names of joined channels.
    pub channels: HashSet<String>,
    /// Name of the oper block used to authenticate, if any.
    pub oper: Option<String>,
    close_reason: Option<String>,
}

pub struct Session {
    pub id: SessionId,
    pub addr: SocketAddr,
    tx: mpsc::Sender<Arc<Message>>,
    cancel: CancellationToken,
    closing: AtomicBool,
    inner: Mutex<SessionData>,
}

impl Session {
    pub fn new(
        id: SessionId,
        addr: SocketAddr,
        tx: mpsc::Sender<Arc<Message>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            addr,
            tx,
            cancel,
            closing: AtomicBool::new(false),
            inner: Mutex::new(SessionData::default()),
        }
    }

    /// Lock the mutable state. Do not hold the guard across an await.
    pub fn data(&self) -> MutexGuard<'_, SessionData> {
        self.inner.lock()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn set_state(&self, state: SessionState) {
        self.inner.lock().state = state;
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn nick(&self) -> Option<String> {
        self.inner.lock().nick.clone()
    }

    /// The nickname, or `*` before one is set.
    pub fn nick_or_star(&self) -> String {
        self.nick().unwrap_or_else(|| "*".to_string())
    }

    pub fn is_oper(&self) -> bool {
        self.inner.lock().oper.is_some()
    }

    pub fn channels(&self) -> Vec<String> {
        self.inner.lock().channels.iter().cloned().collect()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Queue a reply for this session, waiting for room.
    ///
    /// Only the session's own task should use this; others go through
    /// [`Session::try_deliver`].
    pub async fn send(&self, msg: Message) -> Result<(), SessionClosed> {
        self.send_arc(Arc::new(msg)).await
    }

    pub async fn send_arc(&self, msg: Arc<Message>) -> Result<(), SessionClosed> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SessionClosed),
            res = self.tx.send(msg) => res.map_err(|_| SessionClosed),
        }
    }

    /// Queue without waiting.
    ///
    /// Nothing is queued once a close has been requested, so the closing
    /// ERROR line is the last thing the client reads.
    pub fn try_deliver(&self, msg: Arc<Message>) -> Delivery {
        if self.cancel.is_cancelled() {
            return Delivery::Closed;
        }
        match self.tx.try_send(msg) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => Delivery::Full,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Ask the connection task to shut down. The first reason recorded wins.
    pub fn request_close(&self, reason: &str) {
        {
            let mut data = self.inner.lock();
            if data.close_reason.is_none() {
                data.close_reason = Some(reason.to_string());
            }
        }
        self.cancel.cancel();
    }

    pub fn close_reason(&self) -> Option<String> {
        self.inner.lock().close_reason.clone()
    }

    /// Claim the right to run teardown. Only the first caller gets `true`.
    pub fn begin_close(&self) -> bool {
        !self.closing.swap(true, Ordering::AcqRel)
    }

    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("closing", &self.is_closing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonirc_proto::Command;

    fn session(capacity: usize) -> (Session, mpsc::Receiver<Arc<Message>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let addr = "127.0.0.1:4000".parse().unwrap();
        (
            Session::new(SessionId(1), addr, tx, CancellationToken::new()),
            rx,
        )
    }

    fn ping() -> Arc<Message> {
        Arc::new(Command::PING("x".into(), None).into())
    }

    #[test]
    fn try_deliver_reports_full_queue() {
        let (session, mut rx) = session(1);
        assert_eq!(session.try_deliver(ping()), Delivery::Queued);
        assert_eq!(session.try_deliver(ping()), Delivery::Full);
        rx.close();
        while rx.try_recv().is_ok() {}
        assert_eq!(session.try_deliver(ping()), Delivery::Closed);
    }

    #[test]
    fn first_close_reason_wins() {
        let (session, _rx) = session(1);
        session.request_close("SendQ exceeded");
        session.request_close("Killed");
        assert_eq!(session.close_reason().as_deref(), Some("SendQ exceeded"));
        assert!(session.cancel_token().is_cancelled());
    }

    #[test]
    fn begin_close_is_single_shot() {
        let (session, _rx) = session(1);
        assert!(session.begin_close());
        assert!(!session.begin_close());
        assert!(session.is_closing());
    }

    #[tokio::test]
    async fn nothing_is_queued_after_close_request() {
        let (session, mut rx) = session(4);
        session.send(Command::PING("a".into(), None).into()).await.unwrap();
        session.request_close("Killed");
        assert!(session.send(Command::PING("b".into(), None).into()).await.is_err());
        assert_eq!(session.try_deliver(ping()), Delivery::Closed);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
