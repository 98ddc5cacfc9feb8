//! Connection and registration handlers.
//!
//! Handles NICK, USER, CAP, PING, PONG, QUIT commands.

mod cap;
mod nick;
mod ping;
mod user;
mod welcome;

pub use cap::CapHandler;
pub use nick::NickHandler;
pub use ping::{PingHandler, PongHandler, QuitHandler};
pub use user::UserHandler;
