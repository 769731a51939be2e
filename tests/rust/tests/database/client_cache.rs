//! SqliteClientCacheRepository against real SQLite files

use mcpmart_core::{cache_keys, CacheScope, ClientCacheRepository, ProductId};
use mcpmart_storage::{Database, SqliteClientCacheRepository};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tests::db::{in_memory_cache, TestDatabase};
use tokio::sync::Mutex;

fn open(path: &std::path::Path) -> SqliteClientCacheRepository {
    let db = Database::open(path).expect("Failed to open database");
    SqliteClientCacheRepository::new(Arc::new(Mutex::new(db)))
}

#[tokio::test]
async fn test_local_entries_survive_restart_session_entries_do_not() {
    let test_db = TestDatabase::new();
    let path = test_db.db_path().to_path_buf();
    drop(test_db.db);

    {
        let cache = open(&path);
        cache
            .set(CacheScope::Local, cache_keys::ADMIN_TOKEN, "tok")
            .await
            .unwrap();
        cache
            .set(CacheScope::Session, &cache_keys::product(&ProductId::Number(3)), "{}")
            .await
            .unwrap();
    }

    // Next run
    let cache = open(&path);
    assert_eq!(cache.start_session().await.unwrap(), 1);
    assert_eq!(
        cache.get(CacheScope::Local, cache_keys::ADMIN_TOKEN).await.unwrap().as_deref(),
        Some("tok")
    );
    assert_eq!(cache.get(CacheScope::Session, "product_3").await.unwrap(), None);
}

#[tokio::test]
async fn test_product_keys_listed_by_prefix() {
    let cache = in_memory_cache();
    for id in [ProductId::Number(1), ProductId::from("gh-2")] {
        cache
            .set(CacheScope::Session, &cache_keys::product(&id), "{}")
            .await
            .unwrap();
    }
    cache
        .set(CacheScope::Session, cache_keys::CACHED_CUSTOM_PRODUCTS, "[]")
        .await
        .unwrap();

    let keys = cache
        .keys_with_prefix(CacheScope::Session, cache_keys::PRODUCT_PREFIX)
        .await
        .unwrap();
    assert_eq!(keys, vec!["product_1", "product_gh-2"]);
}

#[tokio::test]
async fn test_large_values_round_trip() {
    let cache = in_memory_cache();
    let value = "é".repeat(100_000);
    cache.set(CacheScope::Local, cache_keys::NEWS_DATA, &value).await.unwrap();
    assert_eq!(
        cache.get(CacheScope::Local, cache_keys::NEWS_DATA).await.unwrap(),
        Some(value)
    );
}
