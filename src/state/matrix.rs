//! The Matrix - central shared state for the daemon.
//!
//! The Matrix ties the managers together and owns the two operations that
//! span all of them: attaching a fresh connection and tearing one down.
//! Channel operations live in [`super::membership`].

use super::anonymizer::{Anonymizer, LabelCache};
use super::managers::channel::key;
use super::managers::{ChannelManager, LifecycleManager, SessionManager};
use super::session::{Delivery, Session, SessionId, SessionState};
use crate::config::{Config, ConfigError, ConfigHandle};
use crate::security::BanStore;
use anonirc_proto::chan::SYSTEM;
use anonirc_proto::{Command, Message, Prefix};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// User part of every client prefix.
pub const ANON_USER: &str = "Anon";
/// Host part of every client prefix.
pub const ANON_HOST: &str = "IRC";

/// `name!Anon@IRC`, for labels and for a session's view of itself.
pub fn user_prefix(name: &str) -> Prefix {
    Prefix::new_user(name, ANON_USER, ANON_HOST)
}

/// `ERROR :Closing Link: <ip> (<reason>)`
pub fn closing_link(addr: SocketAddr, reason: &str) -> Message {
    Command::ERROR(format!("Closing Link: {} ({})", addr.ip(), reason)).into()
}

/// The Matrix - central shared state container.
pub struct Matrix {
    pub config: ConfigHandle,
    pub sessions: SessionManager,
    pub channels: ChannelManager,
    pub anonymizer: Anonymizer,
    pub bans: Arc<dyn BanStore>,
    pub lifecycle: LifecycleManager,
    /// Private-message label scopes, one per recipient.
    pub(crate) dm_scopes: DashMap<SessionId, LabelCache>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Matrix {
    pub fn new(config: ConfigHandle, bans: Arc<dyn BanStore>, anonymizer: Anonymizer) -> Self {
        Self {
            config,
            sessions: SessionManager::new(),
            channels: ChannelManager::new(),
            anonymizer,
            bans,
            lifecycle: LifecycleManager::new(),
            dm_scopes: DashMap::new(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn server_name(&self) -> String {
        self.config.current().server.name.clone()
    }

    pub fn server_prefix(&self) -> Prefix {
        Prefix::ServerName(self.server_name())
    }

    /// Create the session record and its bounded outbound queue.
    pub fn attach_session(&self, addr: SocketAddr) -> (Arc<Session>, mpsc::Receiver<Arc<Message>>) {
        let capacity = self.config.current().limits.send_queue.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let id = self.sessions.next_id();
        let session = Arc::new(Session::new(id, addr, tx, self.lifecycle.session_token()));
        self.sessions.insert(Arc::clone(&session));
        debug!(session = %id, %addr, capacity, "Session attached");
        (session, rx)
    }

    /// Ask a session's connection task to close. Never blocks.
    pub fn request_close(&self, id: SessionId, reason: &str) -> bool {
        match self.sessions.get(id) {
            Some(session) => {
                session.request_close(reason);
                true
            }
            None => false,
        }
    }

    /// Tear a session down: leave every channel, drop its labels and its
    /// nickname, then cancel its tasks.
    ///
    /// Safe to call any number of times from any task; only the first call
    /// does anything and returns `true`.
    pub fn close_session(&self, id: SessionId, reason: &str) -> bool {
        let Some(session) = self.sessions.get(id) else {
            return false;
        };
        if !session.begin_close() {
            return false;
        }
        session.set_state(SessionState::Closing);

        let mut departures = Vec::new();
        {
            let mut channels = self.channels.write();
            let joined: Vec<String> = session.data().channels.drain().collect();
            for chan_key in joined {
                let Some(channel) = channels.get_mut(&chan_key) else {
                    continue;
                };
                let Some(label) = channel.label_of(id).map(str::to_owned) else {
                    continue;
                };
                channel.members.forget(id);
                channel.operators.remove(&id);

                let part = Message::new(
                    Some(user_prefix(&label)),
                    Command::PART(channel.name.clone(), Some(reason.to_string())),
                );
                departures.push((channel.members.ids().collect::<Vec<_>>(), Arc::new(part)));

                if channel.members.is_empty() && !channel.is_permanent() {
                    debug!(channel = %channel.name, "Channel destroyed");
                    channels.remove(&chan_key);
                }
            }
        }

        for (recipients, msg) in departures {
            self.fan_out(&recipients, msg);
        }

        if let Some(nick) = session.nick() {
            self.sessions.release_nick(&nick, id);
        }
        self.dm_scopes.remove(&id);
        for mut scope in self.dm_scopes.iter_mut() {
            scope.forget(id);
        }
        self.sessions.remove(id);

        session.set_state(SessionState::Closed);
        session.cancel_token().cancel();
        info!(session = %id, addr = %session.addr, reason, "Session closed");
        true
    }

    /// Queue `msg` on each recipient without waiting. A recipient whose
    /// queue is full is closed with `SendQ exceeded`.
    pub fn fan_out(&self, recipients: &[SessionId], msg: Arc<Message>) {
        for id in recipients {
            let Some(session) = self.sessions.get(*id) else {
                continue;
            };
            match session.try_deliver(Arc::clone(&msg)) {
                Delivery::Queued | Delivery::Closed => {}
                Delivery::Full => {
                    warn!(session = %id, "SendQ exceeded");
                    session.request_close("SendQ exceeded");
                }
            }
        }
    }

    /// Server NOTICE to everyone in `&`.
    pub fn notice_system(&self, text: &str) {
        let recipients: Vec<SessionId> = self
            .channels
            .read()
            .get(&key(SYSTEM))
            .map(|c| c.members.ids().collect())
            .unwrap_or_default();
        let msg = Message::new(
            Some(self.server_prefix()),
            Command::NOTICE(SYSTEM.to_string(), text.to_string()),
        );
        self.fan_out(&recipients, Arc::new(msg));
    }

    /// Re-read configuration and bans. Live sessions are not touched; new
    /// registrations see the new snapshot.
    pub async fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let config = self.config.reload()?;
        match self.bans.reload().await {
            Ok(active) => debug!(active, "Bans reloaded"),
            Err(e) => error!(error = %e, "Ban store reload failed"),
        }
        self.notice_system("Server configuration reloaded");
        Ok(config)
    }

    /// Say goodbye to every session and wait, up to the configured grace
    /// period, for their writers to flush.
    pub async fn shutdown(&self) {
        let grace = self.config.current().limits.shutdown_grace();
        let sessions = self.sessions.all();
        info!(sessions = sessions.len(), "Shutting down");

        for session in &sessions {
            session.try_deliver(Arc::new(closing_link(session.addr, "Server shutting down")));
            session.request_close("Server shutting down");
        }
        self.lifecycle.begin_shutdown();

        if tokio::time::timeout(grace, self.lifecycle.tracker().wait())
            .await
            .is_err()
        {
            warn!(
                remaining = self.lifecycle.tracker().len(),
                "Shutdown grace period elapsed"
            );
        }
    }
}
