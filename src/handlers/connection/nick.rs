//! NICK command handler.
//!
//! The nickname is private: it is only ever shown back to its owner. It
//! still has to be unique so that `PRIVMSG <nick>` has a single recipient.

use super::welcome::try_register;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler, Phase};
use crate::state::{SessionState, user_prefix};
use anonirc_proto::{Command, Message, irc_eq, is_valid_nick};
use async_trait::async_trait;
use tracing::debug;

/// Handler for NICK command.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NICK(nick) = &msg.command else {
            return Ok(());
        };
        if nick.is_empty() {
            return Err(HandlerError::NoNicknameGiven);
        }
        if !is_valid_nick(nick) {
            return Err(HandlerError::ErroneousNickname(nick.clone()));
        }

        let id = ctx.session.id;
        let old = ctx.session.nick();
        if old.as_deref() == Some(nick.as_str()) {
            return Ok(());
        }
        if !ctx.matrix.sessions.claim_nick(nick, id) {
            return Err(HandlerError::NicknameInUse(nick.clone()));
        }
        if let Some(old) = &old
            && !irc_eq(old, nick)
        {
            ctx.matrix.sessions.release_nick(old, id);
        }

        let registered = {
            let mut data = ctx.session.data();
            data.nick = Some(nick.clone());
            if data.state == SessionState::Connected {
                data.state = SessionState::Registering;
            }
            data.state == SessionState::Active
        };
        debug!(session = %id, "Nickname set");

        if registered {
            // nobody else ever sees the nickname, so the change is echoed to
            // its owner only
            let old = old.unwrap_or_else(|| "*".to_string());
            ctx.send(Message::new(
                Some(user_prefix(&old)),
                Command::NICK(nick.clone()),
            ))
            .await
        } else {
            try_register(ctx).await
        }
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}
