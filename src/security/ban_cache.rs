//! In-memory ban store.
//!
//! Used on its own when no database is configured, and as the lookup
//! cache in front of [`super::SqliteBanStore`]. Bans are keyed by mask in a
//! DashMap; expired entries are skipped at lookup time and dropped by
//! [`MemoryBanStore::prune_expired`].

use super::ban::BanEntry;
use super::store::{BanStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::net::IpAddr;
use tracing::debug;

/// DashMap-backed ban list with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryBanStore {
    bans: DashMap<String, BanEntry>,
}

impl MemoryBanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `bans`.
    ///
    /// Called on startup to populate the cache in front of the database.
    pub fn load(bans: Vec<BanEntry>) -> Self {
        let store = Self::new();
        let count = store.replace(bans);
        debug!(count, "Ban cache loaded");
        store
    }

    /// Make the contents exactly `bans`. Returns the new count.
    ///
    /// New entries go in before stale ones are dropped, so a ban present in
    /// both the old and new set is never missing from a concurrent lookup.
    pub fn replace(&self, bans: Vec<BanEntry>) -> usize {
        let masks: HashSet<String> = bans.iter().map(|b| b.mask.clone()).collect();
        for ban in bans {
            self.bans.insert(ban.mask.clone(), ban);
        }
        self.bans.retain(|mask, _| masks.contains(mask));
        self.bans.len()
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let before = self.bans.len();
        self.bans.retain(|_, ban| ban.is_active_at(now));
        before - self.bans.len()
    }
}

#[async_trait]
impl BanStore for MemoryBanStore {
    async fn is_banned(&self, ip: IpAddr) -> Result<Option<BanEntry>, StoreError> {
        let now = chrono::Utc::now().timestamp();
        Ok(self
            .bans
            .iter()
            .find(|entry| entry.is_active_at(now) && entry.matches(ip))
            .map(|entry| entry.value().clone()))
    }

    async fn add_ban(&self, ban: BanEntry) -> Result<(), StoreError> {
        self.bans.insert(ban.mask.clone(), ban);
        Ok(())
    }

    async fn remove_ban(&self, mask: &str) -> Result<bool, StoreError> {
        Ok(self.bans.remove(mask).is_some())
    }

    async fn list_active(&self) -> Result<Vec<BanEntry>, StoreError> {
        let now = chrono::Utc::now().timestamp();
        Ok(self
            .bans
            .iter()
            .filter(|entry| entry.is_active_at(now))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn reload(&self) -> Result<usize, StoreError> {
        let pruned = self.prune_expired();
        debug!(pruned, "Ban cache pruned on reload");
        Ok(self.bans.len())
    }
}
