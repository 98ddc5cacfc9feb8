//! JOIN handler.

use super::names::send_names;
use crate::error::HandlerResult;
use crate::handlers::helpers::split_targets;
use crate::handlers::{Context, Handler};
use crate::state::{JoinOutcome, user_prefix};
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;

/// Handler for JOIN command.
///
/// `JOIN #a,#b` joins each channel in turn; `JOIN 0` leaves them all. Keys
/// are accepted and ignored.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::JOIN(channels, _) = &msg.command else {
            return Ok(());
        };

        if channels == "0" {
            let own = user_prefix(&ctx.nick());
            for name in ctx.matrix.part_all(ctx.session) {
                ctx.send(Message::new(Some(own.clone()), Command::PART(name, None)))
                    .await?;
            }
            return Ok(());
        }

        for name in split_targets(channels) {
            match ctx.matrix.join(ctx.session, name) {
                Ok(Some(outcome)) => send_join_burst(ctx, &outcome).await?,
                Ok(None) => {}
                Err(e) => {
                    let nick = ctx.nick();
                    ctx.send(e.to_irc_reply(ctx.server_name(), &nick)).await?;
                }
            }
        }
        Ok(())
    }
}

/// What the joiner sees: its own JOIN under its nickname, the topic if
/// one is set, then NAMES.
pub async fn send_join_burst(ctx: &Context<'_>, outcome: &JoinOutcome) -> HandlerResult {
    ctx.send(Message::new(
        Some(user_prefix(&ctx.nick())),
        Command::JOIN(outcome.channel.clone(), None),
    ))
    .await?;

    if let Some(topic) = &outcome.topic {
        ctx.send_reply(
            Response::RPL_TOPIC,
            vec![outcome.channel.clone(), topic.text.clone()],
        )
        .await?;
    }

    send_names(ctx, &outcome.channel, &outcome.names).await
}
