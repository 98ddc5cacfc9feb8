//! Channel records.

use super::anonymizer::LabelCache;
use super::session::SessionId;
use anonirc_proto::chan::{LOBBY, SYSTEM};
use std::collections::HashSet;

/// What kind of channel this is. The two built-in channels exist from
/// startup and are never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// `#`: every session is joined on registration.
    Lobby,
    /// `&`: server notices only.
    System,
    User,
}

impl ChannelKind {
    pub fn for_name(name: &str) -> Self {
        match name {
            LOBBY => Self::Lobby,
            SYSTEM => Self::System,
            _ => Self::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    /// Label (or server name) of whoever set it, as seen by the channel.
    pub set_by: String,
    pub set_at: i64,
}

#[derive(Debug)]
pub struct Channel {
    /// Name as first spelled.
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<Topic>,
    /// Membership and labels in one place: a session is a member exactly
    /// when it holds a label here.
    pub members: LabelCache,
    /// Sessions allowed to KICK. The creator of a user channel.
    pub operators: HashSet<SessionId>,
    pub created_at: i64,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ChannelKind::for_name(name),
            topic: None,
            members: LabelCache::default(),
            operators: HashSet::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.kind != ChannelKind::User
    }

    /// Clients may not speak here.
    pub fn is_broadcast_only(&self) -> bool {
        self.kind == ChannelKind::System
    }

    /// Only server operators may change the topic.
    pub fn topic_locked(&self) -> bool {
        self.kind != ChannelKind::User
    }

    pub fn is_member(&self, id: SessionId) -> bool {
        self.members.contains(id)
    }

    pub fn is_operator(&self, id: SessionId) -> bool {
        self.operators.contains(&id)
    }

    pub fn label_of(&self, id: SessionId) -> Option<&str> {
        self.members.get(id)
    }

    /// Everyone but `id`.
    pub fn others(&self, id: SessionId) -> Vec<SessionId> {
        self.members.ids().filter(|m| *m != id).collect()
    }

    /// NAMES entries as `viewer` sees them: its own nickname, everyone
    /// else's label, `@` in front of channel operators.
    pub fn names_for(&self, viewer: SessionId, viewer_nick: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .iter()
            .map(|(id, label)| {
                let shown = if id == viewer { viewer_nick } else { label };
                if self.is_operator(id) {
                    format!("@{shown}")
                } else {
                    shown.to_string()
                }
            })
            .collect();
        names.sort_unstable();
        names
    }
}
