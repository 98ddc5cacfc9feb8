//! MOTD command handler.
//!
//! `MOTD [target]`
//!
//! Returns the "Message of the Day" for the server.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use anonirc_proto::{Message, Response};
use async_trait::async_trait;

/// Handler for MOTD command.
pub struct MotdHandler;

#[async_trait]
impl Handler for MotdHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        send_motd(ctx).await
    }
}

/// 375, one 372 per line, 376; or 422 when the MOTD is empty.
///
/// Lines come from the snapshot in `ctx`, so a reload mid-burst cannot mix
/// two versions.
pub async fn send_motd(ctx: &Context<'_>) -> HandlerResult {
    let lines = ctx.config.motd.lines();
    if lines.is_empty() {
        return ctx
            .send_reply(Response::ERR_NOMOTD, vec!["MOTD File is missing".to_string()])
            .await;
    }

    // RPL_MOTDSTART (375): :- <server> Message of the day -
    ctx.send_reply(
        Response::RPL_MOTDSTART,
        vec![format!("- {} Message of the day -", ctx.server_name())],
    )
    .await?;

    for line in &lines {
        ctx.send_reply(Response::RPL_MOTD, vec![format!("- {line}")])
            .await?;
    }

    // RPL_ENDOFMOTD (376): :End of MOTD command
    ctx.send_reply(
        Response::RPL_ENDOFMOTD,
        vec!["End of MOTD command".to_string()],
    )
    .await
}
