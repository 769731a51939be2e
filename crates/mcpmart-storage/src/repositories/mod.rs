//! Repository implementations using SQLite.

mod client_cache_repository;

pub use client_cache_repository::SqliteClientCacheRepository;
