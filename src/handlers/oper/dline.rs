//! DLINE and UNDLINE handlers.
//!
//! `DLINE [minutes] <mask> [:reason]` bans an address, CIDR block or glob
//! and drops every live session it covers. `UNDLINE <mask>` lifts it.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use crate::security::{BanEntry, is_valid_mask};
use crate::state::closing_link;
use anonirc_proto::{Command, Message};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Handler for DLINE command.
pub struct DlineHandler;

#[async_trait]
impl Handler for DlineHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::DLINE(minutes, mask, reason) = &msg.command else {
            return Ok(());
        };
        ctx.require_oper()?;

        if !is_valid_mask(mask) {
            return ctx.send_notice(format!("Invalid D-line mask: {mask}")).await;
        }

        let minutes = minutes.unwrap_or(ctx.config.bans.default_duration);
        let Some(secs) = minutes_to_secs(minutes) else {
            return ctx
                .send_notice(format!("D-line duration out of range: {minutes}"))
                .await;
        };
        let duration = (secs > 0).then(|| Duration::from_secs(secs));
        let reason = reason
            .clone()
            .unwrap_or_else(|| ctx.config.bans.default_reason.clone());
        let set_by = ctx.session.data().oper.clone().unwrap_or_default();
        let ban = BanEntry::new(mask.clone(), Some(reason), set_by, duration);

        ctx.matrix.bans.add_ban(ban.clone()).await?;

        let closing = format!("Banned: {}", ban.reason());
        let mut dropped = 0usize;
        for session in ctx.matrix.sessions.all() {
            if ban.matches(session.addr.ip()) {
                session.try_deliver(Arc::new(closing_link(session.addr, &closing)));
                session.request_close(&closing);
                dropped += 1;
            }
        }

        info!(mask = %ban.mask, minutes, dropped, "D-line added");
        ctx.matrix
            .notice_system(&format!("D-line added for {} ({} sessions dropped)", ban.mask, dropped));
        ctx.send_notice(format!("D-line added for {}", ban.mask)).await
    }
}

/// Seconds in `minutes`, or `None` when that does not fit a unix timestamp.
fn minutes_to_secs(minutes: u64) -> Option<u64> {
    minutes
        .checked_mul(60)
        .filter(|secs| i64::try_from(*secs).is_ok())
}

/// Handler for UNDLINE command.
pub struct UndlineHandler;

#[async_trait]
impl Handler for UndlineHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::UNDLINE(mask) = &msg.command else {
            return Ok(());
        };
        ctx.require_oper()?;

        if ctx.matrix.bans.remove_ban(mask).await? {
            info!(mask = %mask, "D-line removed");
            ctx.matrix.notice_system(&format!("D-line removed for {mask}"));
            ctx.send_notice(format!("D-line removed for {mask}")).await
        } else {
            ctx.send_notice(format!("No D-line for {mask}")).await
        }
    }
}
