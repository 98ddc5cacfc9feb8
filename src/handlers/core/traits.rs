//! Handler traits.
//!
//! - [`Handler`]: the object-safe trait every command handler implements.
//! - [`Phase`]: when a command may be used. The [`super::Registry`] checks it
//!   before dispatch, so post-registration handlers never run for a session
//!   that has not finished NICK/USER.

use super::context::Context;
use crate::error::HandlerResult;
use anonirc_proto::Message;
use async_trait::async_trait;

/// When a command is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Valid before and after registration (NICK, USER, PING, ...).
    Any,
    /// Valid only once the welcome burst has been sent.
    Registered,
}

/// Command handler.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl Handler for PingHandler {
///     async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
///         let Command::PING(token, _) = &msg.command else {
///             return Ok(());
///         };
///         // ... reply with PONG
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;

    fn phase(&self) -> Phase {
        Phase::Registered
    }
}
