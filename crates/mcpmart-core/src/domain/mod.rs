//! Domain entities, value objects, and events
//!
//! This module contains all domain-level types for McpMart:
//! - Entities (Product, NewsArticle, admin forms)
//! - Value Objects (ProductId, ProductType, DataStatus, CourseLevel)
//! - Domain Events (DomainEvent enum for event-driven architecture)

mod admin;
mod data_status;
mod event;
mod news;
mod product;

pub use admin::*;
pub use data_status::*;
pub use event::{ContentKind, DomainEvent, NewsSource};
pub use news::*;
pub use product::*;
