//! Core handler infrastructure.
//!
//! The handler registry, the per-command [`Context`] and the [`Handler`]
//! trait with its registration [`Phase`].

pub mod context;
pub mod registry;
pub mod traits;

pub use context::Context;
pub use registry::Registry;
pub use traits::{Handler, Phase};
