//! Error handling utilities for IRC connection management.
//!
//! Maps undecodable lines and handler failures onto what the client sees
//! and whether the connection survives.

use crate::error::HandlerError;
use crate::handlers::helpers::server_reply;
use crate::state::{Session, closing_link};
use anonirc_proto::error::MessageParseError;
use anonirc_proto::{Message, ProtocolError, Response};
use std::sync::Arc;
use tracing::{debug, error};

/// What the event loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Disconnect,
}

/// Reply for a line the codec could not turn into a message.
///
/// Every decode error is recoverable: the line is answered and dropped.
pub(super) fn decode_error_reply(server_name: &str, nick: &str, err: &ProtocolError) -> Message {
    let handler_error = match err {
        ProtocolError::MessageTooLong { .. } => HandlerError::InputTooLong,
        ProtocolError::InvalidMessage {
            cause: MessageParseError::NotEnoughArguments { cmd, got, .. },
            ..
        } => match cmd.as_str() {
            "NICK" => HandlerError::NoNicknameGiven,
            "PRIVMSG" | "NOTICE" if *got == 0 => HandlerError::NoRecipient,
            "PRIVMSG" | "NOTICE" => HandlerError::NoTextToSend,
            _ => HandlerError::NeedMoreParams,
        },
        _ => {
            return server_reply(
                server_name,
                Response::ERR_UNKNOWNERROR,
                vec![nick.to_string(), "*".to_string(), "Malformed message".to_string()],
            );
        }
    };

    let cmd_name = match err.parse_cause() {
        Some(MessageParseError::NotEnoughArguments { cmd, .. }) => cmd.as_str(),
        _ => "*",
    };
    handler_error
        .to_irc_reply(server_name, nick, cmd_name)
        .unwrap_or_else(|| {
            server_reply(
                server_name,
                Response::ERR_UNKNOWNERROR,
                vec![nick.to_string(), cmd_name.to_string(), err.to_string()],
            )
        })
}

/// Deliver the client-visible side of a handler error.
pub(super) async fn handle_handler_error(
    server_name: &str,
    session: &Arc<Session>,
    cmd_name: &str,
    err: HandlerError,
) -> Flow {
    let nick = session.nick_or_star();

    match err {
        HandlerError::Quit(reason) => {
            let reason = match reason {
                Some(text) if !text.is_empty() => format!("Quit: {text}"),
                _ => "Client Quit".to_string(),
            };
            session.try_deliver(Arc::new(closing_link(session.addr, &reason)));
            session.request_close(&reason);
            Flow::Disconnect
        }
        HandlerError::Banned(ref reason) => {
            let closing = format!("Banned: {reason}");
            if let Some(reply) = err.to_irc_reply(server_name, &nick, cmd_name) {
                session.try_deliver(Arc::new(reply));
            }
            session.try_deliver(Arc::new(closing_link(session.addr, &closing)));
            session.request_close(&closing);
            Flow::Disconnect
        }
        HandlerError::Send(_) => Flow::Disconnect,
        other => {
            if let HandlerError::Store(e) = &other {
                error!(command = %cmd_name, error = %e, "Ban store failure");
            }
            let Some(reply) = other.to_irc_reply(server_name, &nick, cmd_name) else {
                return Flow::Continue;
            };
            match session.send(reply).await {
                Ok(()) => Flow::Continue,
                Err(_) => {
                    debug!(command = %cmd_name, "Session closed while replying");
                    Flow::Disconnect
                }
            }
        }
    }
}
