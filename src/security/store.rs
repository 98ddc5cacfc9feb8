//! Ban store abstraction.
//!
//! The gateway asks a [`BanStore`] about every accepted address before a
//! single byte is written. Two backends exist: [`SqliteBanStore`] for
//! persistent bans and [`MemoryBanStore`] when no database is
//! configured.

use super::ban::BanEntry;
use super::ban_cache::MemoryBanStore;
use crate::db::{Database, DbError};
use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, info};

/// Ban store failures. Callers decide between fail-open and fail-closed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("ban store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup and administration of address bans.
#[async_trait]
pub trait BanStore: Send + Sync {
    /// The first active ban covering `ip`, if any.
    async fn is_banned(&self, ip: IpAddr) -> Result<Option<BanEntry>, StoreError>;

    /// Add a ban, replacing any ban with the same mask.
    async fn add_ban(&self, ban: BanEntry) -> Result<(), StoreError>;

    /// Remove the ban with exactly this mask.
    async fn remove_ban(&self, mask: &str) -> Result<bool, StoreError>;

    /// All bans that have not expired.
    async fn list_active(&self) -> Result<Vec<BanEntry>, StoreError>;

    /// Re-sync with the backing storage. Returns the active ban count.
    async fn reload(&self) -> Result<usize, StoreError> {
        Ok(self.list_active().await?.len())
    }
}

/// Bans persisted in SQLite.
///
/// Lookups are answered from an in-memory cache loaded at startup and on
/// reload; DLINE/UNDLINE write to the table first, then to the cache.
pub struct SqliteBanStore {
    db: Database,
    cache: MemoryBanStore,
}

impl SqliteBanStore {
    /// Open the store and warm the cache from the table.
    pub async fn open(db: Database) -> Result<Self, StoreError> {
        let cache = MemoryBanStore::load(db.bans().get_active_dlines().await?);
        Ok(Self { db, cache })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl BanStore for SqliteBanStore {
    async fn is_banned(&self, ip: IpAddr) -> Result<Option<BanEntry>, StoreError> {
        self.cache.is_banned(ip).await
    }

    async fn add_ban(&self, ban: BanEntry) -> Result<(), StoreError> {
        self.db.bans().add_dline(&ban).await?;
        debug!(mask = %ban.mask, "D-line stored");
        self.cache.add_ban(ban).await
    }

    async fn remove_ban(&self, mask: &str) -> Result<bool, StoreError> {
        let removed = self.db.bans().remove_dline(mask).await?;
        self.cache.remove_ban(mask).await?;
        Ok(removed)
    }

    async fn list_active(&self) -> Result<Vec<BanEntry>, StoreError> {
        self.cache.list_active().await
    }

    async fn reload(&self) -> Result<usize, StoreError> {
        let pruned = self.db.bans().prune_expired().await?;
        let active = self.cache.replace(self.db.bans().get_active_dlines().await?);
        info!(active, pruned, "Ban store reloaded");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_store_roundtrip() {
        let db = Database::new(":memory:").await.unwrap();
        let store = SqliteBanStore::open(db).await.unwrap();
        let ip: IpAddr = "198.51.100.9".parse().unwrap();

        assert!(store.is_banned(ip).await.unwrap().is_none());
        store
            .add_ban(BanEntry::new("198.51.100.0/24", Some("abuse".into()), "root", None))
            .await
            .unwrap();
        assert_eq!(
            store.is_banned(ip).await.unwrap().unwrap().reason(),
            "abuse"
        );
        assert_eq!(store.reload().await.unwrap(), 1);
        assert!(store.remove_ban("198.51.100.0/24").await.unwrap());
        assert!(store.is_banned(ip).await.unwrap().is_none());
        assert!(store.database().bans().get_active_dlines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_is_warmed_from_the_table_and_resynced_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bans.db");
        let path = path.to_str().unwrap();
        let ip: IpAddr = "203.0.113.5".parse().unwrap();

        {
            let db = Database::new(path).await.unwrap();
            db.bans()
                .add_dline(&BanEntry::new("203.0.113.0/24", Some("old".into()), "root", None))
                .await
                .unwrap();
            db.close().await;
        }

        let store = SqliteBanStore::open(Database::new(path).await.unwrap()).await.unwrap();
        assert_eq!(store.is_banned(ip).await.unwrap().unwrap().reason(), "old");

        // a row removed behind the cache's back stays cached until reload
        store.database().bans().remove_dline("203.0.113.0/24").await.unwrap();
        assert!(store.is_banned(ip).await.unwrap().is_some());
        assert_eq!(store.reload().await.unwrap(), 0);
        assert!(store.is_banned(ip).await.unwrap().is_none());
    }
}
