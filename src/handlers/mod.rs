//! IRC command handlers.
//!
//! One handler per command, grouped by family. The [`Registry`] maps the
//! command name to its handler and enforces the registration phase.

mod channel;
mod connection;
pub mod core;
pub mod helpers;
mod messaging;
mod oper;
mod server_query;

pub use self::core::{Context, Handler, Phase, Registry};
pub use channel::{JoinHandler, KickHandler, ListHandler, NamesHandler, PartHandler, TopicHandler};
pub use connection::{CapHandler, NickHandler, PingHandler, PongHandler, QuitHandler, UserHandler};
pub use messaging::{NoticeHandler, PrivmsgHandler};
pub use oper::{DlineHandler, KillHandler, OperHandler, RehashHandler, UndlineHandler};
pub use server_query::{MotdHandler, send_motd};
