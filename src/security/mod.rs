//! Address bans.
//!
//! - [`BanEntry`]: one D-line with CIDR, exact and glob matching
//! - [`BanStore`]: async lookup/administration trait used by the gateway
//!   and the DLINE/UNDLINE handlers
//! - [`SqliteBanStore`] / [`MemoryBanStore`]: the two backends

pub mod ban;
pub mod ban_cache;
pub mod store;

pub use ban::{BanEntry, is_valid_mask};
pub use ban_cache::MemoryBanStore;
pub use store::{BanStore, SqliteBanStore, StoreError};
