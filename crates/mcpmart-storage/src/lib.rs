//! McpMart Storage Layer
//!
//! SQLite persistence for the client cache (the local and session
//! key-value stores the catalog client keeps between requests).
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcpmart_storage::{Database, SqliteClientCacheRepository};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let db = Database::open(&path)?;
//! let db = Arc::new(Mutex::new(db));
//!
//! let cache = SqliteClientCacheRepository::new(db.clone());
//! cache.start_session().await?;
//! ```

mod database;
mod repositories;

pub use database::Database;
pub use repositories::*;

/// Default database file name.
pub const DATABASE_FILE: &str = "cache.db";

/// Get the default database path for the current platform.
pub fn default_database_path() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|p| p.join(mcpmart_core::config::APP_DIR_NAME).join(DATABASE_FILE))
}
