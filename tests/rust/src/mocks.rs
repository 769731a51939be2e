//! Mock repository implementations for testing
//!
//! In-memory implementation of the cache repository for fast, isolated tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use mcpmart_core::repository::{CacheScope, ClientCacheRepository, RepoResult};

// ============================================================================
// MockClientCacheRepository
// ============================================================================

#[derive(Default)]
pub struct MockClientCacheRepository {
    entries: RwLock<HashMap<(CacheScope, String), String>>,
    fail_reads: bool,
}

impl MockClientCacheRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, scope: CacheScope, key: &str, value: &str) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert((scope, key.to_string()), value.to_string());
        self
    }

    /// Every read returns an error
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Synchronous peek for assertions
    pub fn value(&self, scope: CacheScope, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap()
            .get(&(scope, key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClientCacheRepository for MockClientCacheRepository {
    async fn get(&self, scope: CacheScope, key: &str) -> RepoResult<Option<String>> {
        if self.fail_reads {
            anyhow::bail!("mock read failure");
        }
        Ok(self.value(scope, key))
    }

    async fn set(&self, scope: CacheScope, key: &str, value: &str) -> RepoResult<()> {
        self.entries
            .write()
            .unwrap()
            .insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    async fn delete(&self, scope: CacheScope, key: &str) -> RepoResult<()> {
        self.entries
            .write()
            .unwrap()
            .remove(&(scope, key.to_string()));
        Ok(())
    }

    async fn keys_with_prefix(&self, scope: CacheScope, prefix: &str) -> RepoResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap()
            .keys()
            .filter(|(s, k)| *s == scope && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_scope(&self, scope: CacheScope) -> RepoResult<usize> {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|(s, _), _| *s != scope);
        Ok(before - entries.len())
    }
}
