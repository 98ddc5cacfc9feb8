//! USER command handler.

use super::welcome::try_register;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler, Phase};
use crate::state::SessionState;
use anonirc_proto::{Command, Message};
use async_trait::async_trait;

/// Handler for USER command.
///
/// Username and realname are kept server-side only; clients always see
/// `Anon@IRC`.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::USER(user, _, realname) = &msg.command else {
            return Ok(());
        };
        if user.is_empty() {
            return Err(HandlerError::NeedMoreParams);
        }

        {
            let mut data = ctx.session.data();
            if data.state == SessionState::Active || data.user.is_some() {
                return Err(HandlerError::AlreadyRegistered);
            }
            data.user = Some(user.clone());
            data.realname = Some(realname.clone());
            if data.state == SessionState::Connected {
                data.state = SessionState::Registering;
            }
        }

        try_register(ctx).await
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}
