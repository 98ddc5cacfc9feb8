//! KICK handler.

use crate::error::HandlerResult;
use crate::handlers::helpers::split_targets;
use crate::handlers::{Context, Handler};
use crate::state::user_prefix;
use anonirc_proto::{Command, Message};
use async_trait::async_trait;
use tracing::info;

/// Handler for KICK command.
///
/// Targets are channel labels, the only names a member can see.
pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::KICK(channel, targets, reason) = &msg.command else {
            return Ok(());
        };

        for target in split_targets(targets) {
            match ctx.matrix.kick(ctx.session, channel, target, reason.as_deref()) {
                Ok((chan_name, victim)) => {
                    info!(session = %ctx.session.id, channel = %chan_name, "Kick");
                    ctx.send(Message::new(
                        Some(user_prefix(&ctx.nick())),
                        Command::KICK(chan_name, victim, reason.clone()),
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
