//! # McpMart Core Library
//!
//! Catalog domain, REST client, and admin form rules for McpMart.
//!
//! ## Modules
//!
//! - `domain` - Core entities (Product, NewsArticle, admin forms, DataStatus) and events
//! - `catalog` - Client-side filtering, sorting, pagination, and URL browse state
//! - `validation` - Admin form validation and slugs
//! - `config` - Client configuration from defaults and environment
//! - `repository` - Client cache trait (local and session scopes)
//! - `service` - REST client and the feed, news, status, and admin services
//! - `state` - Shared application status
//! - `event_bus` - Central event distribution system

pub mod catalog;
pub mod config;
pub mod domain;
pub mod event_bus;
pub mod repository;
pub mod service;
pub mod state;
pub mod validation;

// Re-export commonly used types
pub use catalog::*;
pub use config::ClientConfig;
pub use domain::*;
pub use repository::*;
pub use service::*;
pub use state::{AppState, AppStatus, SharedAppState};
pub use validation::{slugify, validate_course, validate_news, ValidationErrors};

// Event-driven architecture exports
pub use event_bus::{create_shared_event_bus, EventBus, EventReceiver, EventSender, SharedEventBus};
