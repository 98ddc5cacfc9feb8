use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use crate::state::closing_link;
use anonirc_proto::{Command, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Handler for KILL command.
///
/// `KILL nickname :reason`
///
/// Disconnects a session. Requires operator privileges. Nobody but the
/// operator learns which session it was.
pub struct KillHandler;

#[async_trait]
impl Handler for KillHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::KILL(target, reason) = &msg.command else {
            return Ok(());
        };
        ctx.require_oper()?;

        let victim = ctx
            .matrix
            .sessions
            .find_by_nick(target)
            .ok_or_else(|| HandlerError::NoSuchNick(target.clone()))?;

        let reason = format!("Killed ({})", reason.as_deref().unwrap_or("No reason given"));
        victim.try_deliver(Arc::new(closing_link(victim.addr, &reason)));
        victim.request_close(&reason);

        info!(killer = %ctx.session.id, victim = %victim.id, "KILL command executed");
        ctx.matrix.notice_system("A session was killed by an operator");
        ctx.send_notice(format!("Killed {target}")).await
    }
}
