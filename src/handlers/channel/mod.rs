//! Channel command handlers.
//!
//! The membership logic itself lives on [`crate::state::Matrix`]; these
//! handlers parse the command, call it, and render the caller's own view.

mod join;
mod kick;
mod list;
mod names;
mod part;
mod topic;

pub use join::{JoinHandler, send_join_burst};
pub use kick::KickHandler;
pub use list::ListHandler;
pub use names::NamesHandler;
pub use part::PartHandler;
pub use topic::TopicHandler;
