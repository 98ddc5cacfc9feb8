//! Operator command handlers split into submodules.

mod auth;
mod dline;
mod kill;
mod rehash;

pub use auth::OperHandler;
pub use dline::{DlineHandler, UndlineHandler};
pub use kill::KillHandler;
pub use rehash::RehashHandler;
