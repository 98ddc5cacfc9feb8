//! NAMES handler.

use crate::error::HandlerResult;
use crate::handlers::helpers::{chunk_names, split_targets};
use crate::handlers::{Context, Handler};
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;

/// Handler for NAMES command.
///
/// Without a parameter, lists the channels the caller is in.
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NAMES(target) = &msg.command else {
            return Ok(());
        };

        let names: Vec<String> = match target {
            Some(list) => split_targets(list).map(str::to_string).collect(),
            None => ctx.session.channels(),
        };

        if names.is_empty() {
            return end_of_names(ctx, "*").await;
        }

        for name in names {
            match ctx.matrix.names(ctx.session, &name) {
                Some((display, entries)) => send_names(ctx, &display, &entries).await?,
                None => end_of_names(ctx, &name).await?,
            }
        }
        Ok(())
    }
}

/// 353 lines for `entries`, then 366.
pub async fn send_names(ctx: &Context<'_>, channel: &str, entries: &[String]) -> HandlerResult {
    for chunk in chunk_names(entries) {
        ctx.send_reply(
            Response::RPL_NAMREPLY,
            vec!["=".to_string(), channel.to_string(), chunk],
        )
        .await?;
    }
    end_of_names(ctx, channel).await
}

async fn end_of_names(ctx: &Context<'_>, channel: &str) -> HandlerResult {
    ctx.send_reply(
        Response::RPL_ENDOFNAMES,
        vec![channel.to_string(), "End of /NAMES list.".to_string()],
    )
    .await
}
