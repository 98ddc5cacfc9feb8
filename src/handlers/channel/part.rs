//! PART handler.

use crate::error::HandlerResult;
use crate::handlers::helpers::split_targets;
use crate::handlers::{Context, Handler};
use crate::state::user_prefix;
use anonirc_proto::{Command, Message};
use async_trait::async_trait;

/// Handler for PART command.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PART(channels, reason) = &msg.command else {
            return Ok(());
        };

        for name in split_targets(channels) {
            match ctx.matrix.part(ctx.session, name, reason.as_deref()) {
                Ok(display) => {
                    ctx.send(Message::new(
                        Some(user_prefix(&ctx.nick())),
                        Command::PART(display, reason.clone()),
                    ))
                    .await?;
                }
                Err(e) => {
                    let nick = ctx.nick();
                    ctx.send(e.to_irc_reply(ctx.server_name(), &nick)).await?;
                }
            }
        }
        Ok(())
    }
}
