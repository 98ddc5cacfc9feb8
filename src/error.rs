//! Error types for command handling.
//!
//! Every variant that the client should hear about maps to exactly one
//! numeric reply via `to_irc_reply`; the rest end the command silently.

use crate::handlers::helpers::server_reply;
use crate::security::StoreError;
use crate::state::SessionClosed;
use anonirc_proto::{Message, Response};
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("no text to send")]
    NoTextToSend,

    #[error("no recipient given")]
    NoRecipient,

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("not registered")]
    NotRegistered,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("permission denied")]
    NoPrivileges,

    #[error("password incorrect")]
    PasswdMismatch,

    #[error("no oper block for this login")]
    NoOperHost,

    #[error("input line too long")]
    InputTooLong,

    /// Address banned at registration; the session is closed after the reply.
    #[error("banned: {0}")]
    Banned(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Send(#[from] SessionClosed),

    #[error("client quit: {0:?}")]
    Quit(Option<String>),
}

impl HandlerError {
    /// Convert to an IRC error reply message.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str, cmd_name: &str) -> Option<Message> {
        let (response, args) = match self {
            Self::NeedMoreParams => (
                Response::ERR_NEEDMOREPARAMS,
                vec![cmd_name.to_string(), "Not enough parameters".to_string()],
            ),
            Self::NoTextToSend => (Response::ERR_NOTEXTTOSEND, vec!["No text to send".to_string()]),
            Self::NoRecipient => (
                Response::ERR_NORECIPIENT,
                vec![format!("No recipient given ({cmd_name})")],
            ),
            Self::NoNicknameGiven => (
                Response::ERR_NONICKNAMEGIVEN,
                vec!["No nickname given".to_string()],
            ),
            Self::NicknameInUse(bad) => (
                Response::ERR_NICKNAMEINUSE,
                vec![bad.clone(), "Nickname is already in use".to_string()],
            ),
            Self::ErroneousNickname(bad) => (
                Response::ERR_ERRONEOUSNICKNAME,
                vec![bad.clone(), "Erroneous nickname".to_string()],
            ),
            Self::NoSuchNick(target) => (
                Response::ERR_NOSUCHNICK,
                vec![target.clone(), "No such nick/channel".to_string()],
            ),
            Self::NotRegistered => (
                Response::ERR_NOTREGISTERED,
                vec!["You have not registered".to_string()],
            ),
            Self::AlreadyRegistered => (
                Response::ERR_ALREADYREGISTERED,
                vec!["You may not reregister".to_string()],
            ),
            Self::UnknownCommand(cmd) => (
                Response::ERR_UNKNOWNCOMMAND,
                vec![cmd.clone(), "Unknown command".to_string()],
            ),
            Self::NoPrivileges => (
                Response::ERR_NOPRIVILEGES,
                vec!["Permission Denied- You're not an IRC operator".to_string()],
            ),
            Self::PasswdMismatch => (
                Response::ERR_PASSWDMISMATCH,
                vec!["Password incorrect".to_string()],
            ),
            Self::NoOperHost => (
                Response::ERR_NOOPERHOST,
                vec!["No O-lines for your host".to_string()],
            ),
            Self::InputTooLong => (
                Response::ERR_INPUTTOOLONG,
                vec!["Input line was too long".to_string()],
            ),
            Self::Banned(_) => (
                Response::ERR_YOUREBANNEDCREEP,
                vec!["You are banned from this server".to_string()],
            ),
            Self::Channel(err) => return Some(err.to_irc_reply(server_name, nick)),
            Self::Store(_) => (
                Response::ERR_UNKNOWNERROR,
                vec![cmd_name.to_string(), "Ban store unavailable".to_string()],
            ),

            // These errors don't get client-visible replies
            Self::Send(_) | Self::Quit(_) => return None,
        };

        Some(numeric(server_name, response, nick, args))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Channel Errors (membership and broadcast)
// ============================================================================

/// Channel operation errors. Each carries the channel name as the client
/// typed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("not on channel: {0}")]
    NotOnChannel(String),

    #[error("bad channel name: {0}")]
    BadChannelName(String),

    #[error("cannot send to channel: {0}")]
    CannotSendToChan(String),

    #[error("not channel operator: {0}")]
    ChanOpPrivsNeeded(String),

    #[error("{target} is not on {channel}")]
    UserNotInChannel { target: String, channel: String },
}

impl ChannelError {
    /// Convert to an IRC error reply message.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str) -> Message {
        let (response, args) = match self {
            Self::NoSuchChannel(chan) => (
                Response::ERR_NOSUCHCHANNEL,
                vec![chan.clone(), "No such channel".to_string()],
            ),
            Self::NotOnChannel(chan) => (
                Response::ERR_NOTONCHANNEL,
                vec![chan.clone(), "You're not on that channel".to_string()],
            ),
            Self::BadChannelName(chan) => (
                Response::ERR_BADCHANMASK,
                vec![chan.clone(), "Bad Channel Mask".to_string()],
            ),
            Self::CannotSendToChan(chan) => (
                Response::ERR_CANNOTSENDTOCHAN,
                vec![chan.clone(), "Cannot send to channel".to_string()],
            ),
            Self::ChanOpPrivsNeeded(chan) => (
                Response::ERR_CHANOPRIVSNEEDED,
                vec![chan.clone(), "You're not channel operator".to_string()],
            ),
            Self::UserNotInChannel { target, channel } => (
                Response::ERR_USERNOTINCHANNEL,
                vec![
                    target.clone(),
                    channel.clone(),
                    "They aren't on that channel".to_string(),
                ],
            ),
        };
        numeric(server_name, response, nick, args)
    }
}

/// `:server <code> <nick> args...`
fn numeric(server_name: &str, response: Response, nick: &str, args: Vec<String>) -> Message {
    let mut params = Vec::with_capacity(args.len() + 1);
    params.push(nick.to_string());
    params.extend(args);
    server_reply(server_name, response, params)
}
