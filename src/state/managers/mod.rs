//! Domain managers for server state.
//!
//! Each manager owns one slice of the daemon's state so the
//! [`crate::state::Matrix`] can stay a thin coordinator.

pub mod channel;
pub mod lifecycle;
pub mod session;

pub use channel::ChannelManager;
pub use lifecycle::LifecycleManager;
pub use session::SessionManager;
