//! Command handler registry and dispatch.

use super::context::Context;
use super::traits::{Handler, Phase};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{
    channel::{JoinHandler, KickHandler, ListHandler, NamesHandler, PartHandler, TopicHandler},
    connection::{CapHandler, NickHandler, PingHandler, PongHandler, QuitHandler, UserHandler},
    messaging::{NoticeHandler, PrivmsgHandler},
    oper::{DlineHandler, KillHandler, OperHandler, RehashHandler, UndlineHandler},
    server_query::MotdHandler,
};
use anonirc_proto::{ChannelExt, Command, Message};
use std::collections::HashMap;
use tracing::{Instrument, Level, debug, span};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("CAP", Box::new(CapHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("NAMES", Box::new(NamesHandler));
        handlers.insert("LIST", Box::new(ListHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));

        // Server query handlers
        handlers.insert("MOTD", Box::new(MotdHandler));

        // Operator handlers
        handlers.insert("OPER", Box::new(OperHandler));
        handlers.insert("KILL", Box::new(KillHandler));
        handlers.insert("DLINE", Box::new(DlineHandler));
        handlers.insert("UNDLINE", Box::new(UndlineHandler));
        handlers.insert("REHASH", Box::new(RehashHandler));

        Self { handlers }
    }

    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Before registration only [`Phase::Any`] handlers run; every other
    /// command, known or not, fails with 451.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let cmd_name = msg.command.name();
        let registered = ctx.session.is_active();

        let Some(handler) = self.handlers.get(cmd_name.as_str()) else {
            if !registered {
                return Err(HandlerError::NotRegistered);
            }
            // numerics and other server-only commands from a client
            return Err(HandlerError::UnknownCommand(cmd_name));
        };

        if !registered && handler.phase() != Phase::Any {
            return Err(HandlerError::NotRegistered);
        }

        let channel = first_channel(&msg.command);
        let irc_span = span!(
            Level::DEBUG,
            "irc.command",
            command = %cmd_name,
            session = %ctx.session.id,
            channel = channel,
        );

        let result = handler.handle(ctx, msg).instrument(irc_span).await;
        if let Err(ref e) = result {
            debug!(command = %cmd_name, session = %ctx.session.id, error = %e, "Command error");
        }
        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn first_channel(command: &Command) -> Option<&str> {
    let target = match command {
        Command::JOIN(t, _)
        | Command::PART(t, _)
        | Command::TOPIC(t, _)
        | Command::KICK(t, _, _)
        | Command::PRIVMSG(t, _)
        | Command::NOTICE(t, _) => t.as_str(),
        _ => return None,
    };
    target.is_channel_name().then_some(target)
}
