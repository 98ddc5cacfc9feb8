//! Channel membership and message routing.
//!
//! Every operation here follows the same shape: take the registry lock,
//! update both sides of the membership and build the outgoing message, drop
//! the lock, then fan out. The acting session hears about its own actions
//! from its handler, under its own nickname; everyone else sees a label.

use super::channel::{Channel, Topic};
use super::managers::channel::key;
use super::matrix::{Matrix, user_prefix};
use super::session::{Session, SessionId};
use crate::error::{ChannelError, HandlerError};
use anonirc_proto::{ChannelExt, Command, Message};
use std::sync::Arc;
use tracing::debug;

/// What a joining session needs to render its own JOIN burst.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Display name of the channel.
    pub channel: String,
    /// The label other members will see.
    pub label: String,
    pub topic: Option<Topic>,
    /// NAMES entries as the joiner sees them.
    pub names: Vec<String>,
    pub created: bool,
}

/// One row of a LIST reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub members: usize,
    pub topic: Option<String>,
}

impl Matrix {
    /// Join `name`, creating it if needed. `Ok(None)` when already joined.
    pub fn join(&self, session: &Session, name: &str) -> Result<Option<JoinOutcome>, ChannelError> {
        if !name.is_valid_channel_name() {
            return Err(ChannelError::BadChannelName(name.to_string()));
        }
        let chan_key = key(name);
        let nick = session.nick_or_star();

        let (outcome, recipients) = {
            let mut channels = self.channels.write();
            let created = !channels.contains_key(&chan_key);
            let channel = channels
                .entry(chan_key.clone())
                .or_insert_with(|| Channel::new(name));

            if channel.is_member(session.id) {
                return Ok(None);
            }

            let label = self.anonymizer.label_for(&mut channel.members, session.id);
            if created && !channel.is_permanent() {
                channel.operators.insert(session.id);
            }
            session.data().channels.insert(chan_key);

            let outcome = JoinOutcome {
                channel: channel.name.clone(),
                label,
                topic: channel.topic.clone(),
                names: channel.names_for(session.id, &nick),
                created,
            };
            (outcome, channel.others(session.id))
        };

        debug!(session = %session.id, channel = %outcome.channel, created = outcome.created, "Joined");
        let msg = Message::new(
            Some(user_prefix(&outcome.label)),
            Command::JOIN(outcome.channel.clone(), None),
        );
        self.fan_out(&recipients, Arc::new(msg));
        Ok(Some(outcome))
    }

    /// Leave `name`. Returns the channel's display name.
    pub fn part(&self, session: &Session, name: &str, reason: Option<&str>) -> Result<String, ChannelError> {
        let chan_key = key(name);

        let (chan_name, label, recipients) = {
            let mut channels = self.channels.write();
            let channel = channels
                .get_mut(&chan_key)
                .ok_or_else(|| ChannelError::NoSuchChannel(name.to_string()))?;
            let label = self
                .anonymizer
                .release(&mut channel.members, session.id)
                .ok_or_else(|| ChannelError::NotOnChannel(name.to_string()))?;
            channel.operators.remove(&session.id);
            session.data().channels.remove(&chan_key);

            let chan_name = channel.name.clone();
            let recipients: Vec<SessionId> = channel.members.ids().collect();
            if channel.members.is_empty() && !channel.is_permanent() {
                channels.remove(&chan_key);
                debug!(channel = %chan_name, "Channel destroyed");
            }
            (chan_name, label, recipients)
        };

        let msg = Message::new(
            Some(user_prefix(&label)),
            Command::PART(chan_name.clone(), reason.map(str::to_string)),
        );
        self.fan_out(&recipients, Arc::new(msg));
        Ok(chan_name)
    }

    /// Leave every joined channel (`JOIN 0`).
    pub fn part_all(&self, session: &Session) -> Vec<String> {
        session
            .channels()
            .into_iter()
            .filter_map(|chan_key| self.part(session, &chan_key, None).ok())
            .collect()
    }

    /// PRIVMSG/NOTICE to a channel, shown to the other members under the
    /// sender's label.
    pub fn broadcast_text(
        &self,
        sender: &Session,
        target: &str,
        text: &str,
        notice: bool,
    ) -> Result<(), ChannelError> {
        let (label, chan_name, recipients) = {
            let channels = self.channels.read();
            let channel = channels
                .get(&key(target))
                .ok_or_else(|| ChannelError::NoSuchChannel(target.to_string()))?;
            if channel.is_broadcast_only() {
                return Err(ChannelError::CannotSendToChan(target.to_string()));
            }
            let label = channel
                .label_of(sender.id)
                .ok_or_else(|| ChannelError::CannotSendToChan(target.to_string()))?
                .to_string();
            (label, channel.name.clone(), channel.others(sender.id))
        };

        let command = if notice {
            Command::NOTICE(chan_name, text.to_string())
        } else {
            Command::PRIVMSG(chan_name, text.to_string())
        };
        self.fan_out(&recipients, Arc::new(Message::new(Some(user_prefix(&label)), command)));
        Ok(())
    }

    /// PRIVMSG/NOTICE to a nickname. The recipient sees the sender under a
    /// label from the recipient's own private scope.
    pub fn private_message(
        &self,
        sender: &Session,
        nick: &str,
        text: &str,
        notice: bool,
    ) -> Result<(), HandlerError> {
        let recipient = self
            .sessions
            .find_by_nick(nick)
            .filter(|r| r.is_active() && !r.is_closing())
            .ok_or_else(|| HandlerError::NoSuchNick(nick.to_string()))?;
        let recipient_nick = recipient.nick_or_star();

        let label = {
            let mut scope = self.dm_scopes.entry(recipient.id).or_default();
            self.anonymizer.label_for(&mut scope, sender.id)
        };

        let command = if notice {
            Command::NOTICE(recipient_nick, text.to_string())
        } else {
            Command::PRIVMSG(recipient_nick, text.to_string())
        };
        self.fan_out(&[recipient.id], Arc::new(Message::new(Some(user_prefix(&label)), command)));

        // lost a race with the recipient's teardown
        if recipient.is_closing() {
            self.dm_scopes.remove(&recipient.id);
        }
        Ok(())
    }

    /// Remove the member labelled `target` from `name`.
    ///
    /// Only the channel's operators and server operators may kick.
    pub fn kick(
        &self,
        kicker: &Session,
        name: &str,
        target: &str,
        reason: Option<&str>,
    ) -> Result<(String, String), ChannelError> {
        let chan_key = key(name);

        let (chan_name, kicker_label, victim, victim_label, victim_session, recipients) = {
            let mut channels = self.channels.write();
            let channel = channels
                .get_mut(&chan_key)
                .ok_or_else(|| ChannelError::NoSuchChannel(name.to_string()))?;
            let kicker_label = channel
                .label_of(kicker.id)
                .ok_or_else(|| ChannelError::NotOnChannel(name.to_string()))?
                .to_string();
            if !channel.is_operator(kicker.id) && !kicker.is_oper() {
                return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()));
            }
            let victim = channel.members.find(target).ok_or_else(|| {
                ChannelError::UserNotInChannel {
                    target: target.to_string(),
                    channel: name.to_string(),
                }
            })?;

            let recipients = channel.others(kicker.id);
            let victim_label = self
                .anonymizer
                .release(&mut channel.members, victim)
                .unwrap_or_default();
            channel.operators.remove(&victim);

            let victim_session = self.sessions.get(victim);
            if let Some(v) = &victim_session {
                v.data().channels.remove(&chan_key);
            }

            let chan_name = channel.name.clone();
            if channel.members.is_empty() && !channel.is_permanent() {
                channels.remove(&chan_key);
            }
            (chan_name, kicker_label, victim, victim_label, victim_session, recipients)
        };

        let reason = reason.map(str::to_string);
        let shared = Arc::new(Message::new(
            Some(user_prefix(&kicker_label)),
            Command::KICK(chan_name.clone(), victim_label.clone(), reason.clone()),
        ));
        let others: Vec<SessionId> = recipients.into_iter().filter(|id| *id != victim).collect();
        self.fan_out(&others, shared);

        if let Some(v) = victim_session {
            let own = Message::new(
                Some(user_prefix(&kicker_label)),
                Command::KICK(chan_name.clone(), v.nick_or_star(), reason),
            );
            self.fan_out(&[victim], Arc::new(own));
        }

        debug!(channel = %chan_name, "Member kicked");
        Ok((chan_name, victim_label))
    }

    /// Current topic of `name`.
    pub fn topic(&self, name: &str) -> Result<(String, Option<Topic>), ChannelError> {
        let channels = self.channels.read();
        let channel = channels
            .get(&key(name))
            .ok_or_else(|| ChannelError::NoSuchChannel(name.to_string()))?;
        Ok((channel.name.clone(), channel.topic.clone()))
    }

    /// Change the topic. Members of user channels may set it; the built-in
    /// channels need a server operator.
    pub fn set_topic(&self, session: &Session, name: &str, text: &str) -> Result<Topic, ChannelError> {
        let (chan_name, topic, recipients) = {
            let mut channels = self.channels.write();
            let channel = channels
                .get_mut(&key(name))
                .ok_or_else(|| ChannelError::NoSuchChannel(name.to_string()))?;
            let label = channel
                .label_of(session.id)
                .ok_or_else(|| ChannelError::NotOnChannel(name.to_string()))?
                .to_string();
            if channel.topic_locked() && !session.is_oper() {
                return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()));
            }

            let topic = Topic {
                text: text.to_string(),
                set_by: label,
                set_at: chrono::Utc::now().timestamp(),
            };
            channel.topic = (!text.is_empty()).then(|| topic.clone());
            (channel.name.clone(), topic, channel.others(session.id))
        };

        let msg = Message::new(
            Some(user_prefix(&topic.set_by)),
            Command::TOPIC(chan_name, Some(topic.text.clone())),
        );
        self.fan_out(&recipients, Arc::new(msg));
        Ok(topic)
    }

    /// NAMES for one channel as `session` sees it.
    pub fn names(&self, session: &Session, name: &str) -> Option<(String, Vec<String>)> {
        let nick = session.nick_or_star();
        let channels = self.channels.read();
        let channel = channels.get(&key(name))?;
        Some((channel.name.clone(), channel.names_for(session.id, &nick)))
    }

    /// Every channel, or only those named in `filter` (comma separated).
    pub fn list(&self, filter: Option<&str>) -> Vec<ListEntry> {
        let channels = self.channels.read();
        let entry = |c: &Channel| ListEntry {
            name: c.name.clone(),
            members: c.members.len(),
            topic: c.topic.as_ref().map(|t| t.text.clone()),
        };

        let mut entries: Vec<ListEntry> = match filter {
            Some(names) => names
                .split(',')
                .filter_map(|n| channels.get(&key(n)).map(entry))
                .collect(),
            None => channels.values().map(entry).collect(),
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}
