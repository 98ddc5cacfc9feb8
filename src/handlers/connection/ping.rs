//! PING, PONG and QUIT handlers.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler, Phase};
use anonirc_proto::{Command, Message, Prefix};
use async_trait::async_trait;
use tracing::info;

/// Handler for PING command.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // PING <token>
        let Command::PING(token, _) = &msg.command else {
            return Ok(());
        };
        let server = ctx.server_name().to_string();
        let pong = Message::new(
            Some(Prefix::ServerName(server.clone())),
            Command::PONG(server, Some(token.clone())),
        );
        ctx.send(pong).await
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}

/// Handler for PONG command.
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        // Just acknowledge PONG - resets idle timer (handled in connection loop)
        Ok(())
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}

/// Handler for QUIT command.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::QUIT(reason) = &msg.command else {
            return Ok(());
        };
        info!(session = %ctx.session.id, "Client quit");

        // Signal quit by returning Quit error that connection loop will handle
        Err(HandlerError::Quit(reason.clone()))
    }

    fn phase(&self) -> Phase {
        Phase::Any
    }
}
