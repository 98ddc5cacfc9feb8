//! OPER handler.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;
use tracing::{info, warn};

/// Handler for OPER command.
///
/// `OPER <name> <password>` against the `[[oper]]` blocks of the current
/// configuration snapshot.
pub struct OperHandler;

#[async_trait]
impl Handler for OperHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::OPER(name, password) = &msg.command else {
            return Ok(());
        };

        let Some(block) = ctx.config.oper.iter().find(|o| &o.name == name) else {
            warn!(session = %ctx.session.id, "OPER with unknown name");
            return Err(HandlerError::NoOperHost);
        };
        if !block.verify_password(password) {
            warn!(session = %ctx.session.id, oper = %name, "OPER with wrong password");
            return Err(HandlerError::PasswdMismatch);
        }

        ctx.session.data().oper = Some(block.name.clone());
        info!(session = %ctx.session.id, oper = %block.name, "Operator login");
        ctx.send_reply(
            Response::RPL_YOUREOPER,
            vec!["You are now an IRC operator".to_string()],
        )
        .await
    }
}
