//! Command handler context.
//!
//! A [`Context`] is built by the connection loop for every decoded message.
//! It carries the shared [`Matrix`], the originating session and the
//! configuration snapshot in force when the command arrived.

use crate::config::Config;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::helpers::{server_notice, server_reply};
use crate::state::{Matrix, Session};
use anonirc_proto::{Message, Response};
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
    /// The session that sent the command.
    pub session: &'a Arc<Session>,
    /// Config snapshot for the duration of this command.
    pub config: Arc<Config>,
    /// Remote address of the client.
    pub remote_addr: SocketAddr,
}

impl<'a> Context<'a> {
    pub fn new(matrix: &'a Arc<Matrix>, session: &'a Arc<Session>) -> Self {
        Self {
            matrix,
            session,
            config: matrix.config.current(),
            remote_addr: session.addr,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.config.server.name
    }

    /// The session's nickname, or `*` before one is set.
    pub fn nick(&self) -> String {
        self.session.nick_or_star()
    }

    /// Queue a message for this session, waiting for room.
    pub async fn send(&self, msg: Message) -> HandlerResult {
        self.session.send(msg).await?;
        Ok(())
    }

    /// Build and send a numeric reply addressed to this session.
    pub async fn send_reply(&self, response: Response, args: Vec<String>) -> HandlerResult {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(self.nick());
        params.extend(args);
        self.send(server_reply(self.server_name(), response, params))
            .await
    }

    /// Server NOTICE to this session.
    pub async fn send_notice(&self, text: impl Into<String>) -> HandlerResult {
        let nick = self.nick();
        self.send(server_notice(self.server_name(), &nick, text)).await
    }

    /// Fail with 481 unless the session is a server operator.
    pub fn require_oper(&self) -> HandlerResult {
        if self.session.is_oper() {
            Ok(())
        } else {
            Err(HandlerError::NoPrivileges)
        }
    }
}
