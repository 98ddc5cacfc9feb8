//! IRC protocol primitives for anonircd.
//!
//! This crate owns the wire format: parsing raw lines into [`Message`]s,
//! rendering them back, numeric replies and the CRLF line codec used by the
//! daemon's connection tasks.
//!
//! # Quick Start
//!
//! ```
//! use anonirc_proto::{Command, Message};
//!
//! let msg: Message = "PRIVMSG #test :hello there\r\n".parse().unwrap();
//! assert_eq!(
//!     msg.command,
//!     Command::PRIVMSG("#test".into(), "hello there".into())
//! );
//! assert_eq!(msg.to_string(), "PRIVMSG #test :hello there");
//! ```

#![deny(clippy::all)]

pub mod casemap;
pub mod chan;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod prefix;
pub mod response;
pub mod util;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::chan::ChannelExt;
#[cfg(feature = "tokio")]
pub use self::codec::IrcCodec;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;
pub use self::util::{is_valid_nick, wildcard_match};

/// Maximum length of a single IRC line, CRLF included.
pub const MAX_LINE_LEN: usize = 512;
