//! SQLite implementation of ClientCacheRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mcpmart_core::{CacheScope, ClientCacheRepository};
use rusqlite::params;
use tokio::sync::Mutex;

use crate::Database;

/// SQLite-backed client cache.
///
/// One table holds both scopes. Typical keys:
/// - `news_data` (local) - last news feed served by the API, as JSON
/// - `admin_token` (local) - bearer token for admin submissions
/// - `product_{id}` (session) - product detail JSON
/// - `cached_custom_products` (session) - JSON array of products
pub struct SqliteClientCacheRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteClientCacheRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClientCacheRepository for SqliteClientCacheRepository {
    async fn get(&self, scope: CacheScope, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;

        let result = db.connection().query_row(
            "SELECT value FROM client_cache WHERE scope = ? AND key = ?",
            params![scope.as_str(), key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, scope: CacheScope, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "INSERT INTO client_cache (scope, key, value, updated_at)
             VALUES (?, ?, ?, datetime('now'))
             ON CONFLICT(scope, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![scope.as_str(), key, value],
        )?;

        Ok(())
    }

    async fn delete(&self, scope: CacheScope, key: &str) -> Result<()> {
        let db = self.db.lock().await;

        db.connection().execute(
            "DELETE FROM client_cache WHERE scope = ? AND key = ?",
            params![scope.as_str(), key],
        )?;

        Ok(())
    }

    async fn keys_with_prefix(&self, scope: CacheScope, prefix: &str) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        // substr comparison keeps `_` and `%` in prefixes literal
        let mut stmt = conn.prepare(
            "SELECT key FROM client_cache
             WHERE scope = ?1 AND substr(key, 1, length(?2)) = ?2
             ORDER BY key",
        )?;
        let keys = stmt
            .query_map(params![scope.as_str(), prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }

    async fn clear_scope(&self, scope: CacheScope) -> Result<usize> {
        let db = self.db.lock().await;

        let removed = db.connection().execute(
            "DELETE FROM client_cache WHERE scope = ?",
            params![scope.as_str()],
        )?;

        Ok(removed)
    }
}
