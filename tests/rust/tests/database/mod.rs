//! Storage tests: migrations and the SQLite client cache

mod client_cache;
