//! Repository traits for data access
//!
//! These traits define the interface for client-side persistence without
//! specifying the implementation (SQLite, in-memory, etc.)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for repository operations
pub type RepoResult<T> = anyhow::Result<T>;

/// Lifetime of a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// Survives restarts
    Local,
    /// Cleared whenever a new session starts
    Session,
}

impl CacheScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "session" => Self::Session,
            _ => Self::Local,
        }
    }
}

/// Well-known cache keys
pub mod cache_keys {
    use crate::domain::ProductId;

    /// Cached news feed (local)
    pub const NEWS_DATA: &str = "news_data";
    /// Bearer token for admin endpoints (local)
    pub const ADMIN_TOKEN: &str = "admin_token";
    /// User-curated product list kept for fast back-navigation (session)
    pub const CACHED_CUSTOM_PRODUCTS: &str = "cached_custom_products";
    /// Prefix of per-product detail entries (session)
    pub const PRODUCT_PREFIX: &str = "product_";

    /// Key of a product detail entry
    pub fn product(id: &ProductId) -> String {
        format!("{}{}", PRODUCT_PREFIX, id)
    }
}

/// Key-value store standing in for browser local/session storage.
#[async_trait]
pub trait ClientCacheRepository: Send + Sync {
    /// Get a value
    async fn get(&self, scope: CacheScope, key: &str) -> RepoResult<Option<String>>;

    /// Set a value (insert or update)
    async fn set(&self, scope: CacheScope, key: &str, value: &str) -> RepoResult<()>;

    /// Delete a value
    async fn delete(&self, scope: CacheScope, key: &str) -> RepoResult<()>;

    /// Keys in a scope starting with `prefix`, sorted
    async fn keys_with_prefix(&self, scope: CacheScope, prefix: &str) -> RepoResult<Vec<String>>;

    /// Remove everything in a scope, returning how many entries were removed
    async fn clear_scope(&self, scope: CacheScope) -> RepoResult<usize>;

    /// Begin a new session: session-scoped entries from the last run are dropped
    async fn start_session(&self) -> RepoResult<usize> {
        let removed = self.clear_scope(CacheScope::Session).await?;
        tracing::debug!(removed, "[Cache] Started new session");
        Ok(removed)
    }
}
