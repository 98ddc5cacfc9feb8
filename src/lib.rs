//! anonircd - Anonymous IRC Daemon
//!
//! A small IRC server where nobody has a visible identity: every member of
//! a channel is shown under a throwaway label chosen per channel, and the
//! only host anyone ever sees is `Anon@IRC`.
//!
//! The binary in `main.rs` wires these modules together; the library split
//! exists so integration tests can run a server in-process.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod network;
pub mod security;
pub mod state;
