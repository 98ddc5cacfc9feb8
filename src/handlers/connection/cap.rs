//! CAP handler.
//!
//! No capabilities are offered. `CAP LS` gets an empty list so that
//! clients which probe first carry on with NICK/USER; `CAP END` and the
//! rest are accepted and ignored. Registration is never held back.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler, Phase};
use anonirc_proto::{Command, Message, Prefix};
use async_trait::async_trait;

pub struct CapHandler;

#[async_trait]
impl Handler for CapHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::CAP(_, sub, _) = &msg.command else {
            return Ok(());
        };
        if sub != "LS" && sub != "LIST" {
            return Ok(());
        }

        let reply = Message::new(
            Some(Prefix::ServerName(ctx.server_name().to_string())),
            Command::CAP(Some(ctx.nick()), sub.clone(), Some(String::new())),
        );
        ctx.send(reply).await
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}
