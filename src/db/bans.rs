//! Repository for D-lines (address bans).

use super::DbError;
use crate::security::BanEntry;
use sqlx::SqlitePool;

/// Repository for ban operations.
pub struct BanRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BanRepository<'a> {
    /// Create a new ban repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add or replace a D-line.
    pub async fn add_dline(&self, ban: &BanEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dlines (mask, reason, set_by, set_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ban.mask)
        .bind(&ban.reason)
        .bind(&ban.set_by)
        .bind(ban.set_at)
        .bind(ban.expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a D-line. Returns whether a row existed.
    pub async fn remove_dline(&self, mask: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM dlines WHERE mask = ?")
            .bind(mask)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get all D-lines that have not expired.
    pub async fn get_active_dlines(&self) -> Result<Vec<BanEntry>, DbError> {
        let now = chrono::Utc::now().timestamp();

        let rows = sqlx::query_as::<_, (String, Option<String>, String, i64, Option<i64>)>(
            r#"
            SELECT mask, reason, set_by, set_at, expires_at
            FROM dlines
            WHERE expires_at IS NULL OR expires_at > ?
            "#,
        )
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(mask, reason, set_by, set_at, expires_at)| BanEntry {
                mask,
                reason,
                set_by,
                set_at,
                expires_at,
            })
            .collect())
    }

    /// Delete rows whose expiry has passed.
    pub async fn prune_expired(&self) -> Result<u64, DbError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query("DELETE FROM dlines WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
