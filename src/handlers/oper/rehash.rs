//! REHASH handler.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;
use tracing::{error, info};

/// Handler for REHASH command.
///
/// Same effect as SIGHUP: configuration and bans are reloaded, live
/// sessions keep going.
pub struct RehashHandler;

#[async_trait]
impl Handler for RehashHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if !matches!(msg.command, Command::REHASH) {
            return Ok(());
        }
        ctx.require_oper()?;

        let file = ctx
            .matrix
            .config
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".to_string());
        ctx.send_reply(Response::RPL_REHASHING, vec![file, "Rehashing".to_string()])
            .await?;

        match ctx.matrix.reload().await {
            Ok(_) => {
                info!(session = %ctx.session.id, "REHASH complete");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "REHASH failed");
                ctx.send_notice(format!("Rehash failed: {e}")).await
            }
        }
    }
}
