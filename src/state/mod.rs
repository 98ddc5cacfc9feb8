//! State management module.
//!
//! Contains the Matrix (shared server state) and the records it manages.

pub mod anonymizer;
pub mod channel;
pub mod managers;
mod matrix;
mod membership;
pub mod session;

pub use anonymizer::{Anonymizer, LabelCache};
pub use channel::{Channel, ChannelKind, Topic};
pub use matrix::{ANON_HOST, ANON_USER, Matrix, closing_link, user_prefix};
pub use membership::{JoinOutcome, ListEntry};
pub use session::{Delivery, Session, SessionClosed, SessionData, SessionId, SessionState};
