//! PRIVMSG and NOTICE handlers.
//!
//! Both share one routing path. Channel targets fan out under the sender's
//! channel label; nickname targets get a label from the recipient's private
//! scope. NOTICE never produces an error reply.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::helpers::split_targets;
use crate::handlers::{Context, Handler};
use anonirc_proto::{ChannelExt, Command, Message};
use async_trait::async_trait;

/// Handler for PRIVMSG command.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PRIVMSG(targets, text) = &msg.command else {
            return Ok(());
        };
        route(ctx, targets, text, false).await
    }
}

/// Handler for NOTICE command.
pub struct NoticeHandler;

#[async_trait]
impl Handler for NoticeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NOTICE(targets, text) = &msg.command else {
            return Ok(());
        };
        // errors are swallowed; a failed NOTICE must not generate replies
        let _ = route(ctx, targets, text, true).await;
        Ok(())
    }
}

async fn route(ctx: &Context<'_>, targets: &str, text: &str, notice: bool) -> HandlerResult {
    if targets.is_empty() {
        return Err(HandlerError::NoRecipient);
    }
    if text.is_empty() {
        return Err(HandlerError::NoTextToSend);
    }

    for target in split_targets(targets) {
        let result = if target.is_channel_name() {
            ctx.matrix
                .broadcast_text(ctx.session, target, text, notice)
                .map_err(HandlerError::from)
        } else {
            ctx.matrix.private_message(ctx.session, target, text, notice)
        };

        match result {
            Ok(()) => {}
            Err(_) if notice => {}
            Err(e) => {
                let nick = ctx.nick();
                if let Some(reply) = e.to_irc_reply(ctx.server_name(), &nick, "PRIVMSG") {
                    ctx.send(reply).await?;
                }
            }
        }
    }
    Ok(())
}
