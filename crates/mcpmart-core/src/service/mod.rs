//! Services
//!
//! Everything that talks to the REST API, built on [`CatalogApiClient`].

mod admin_service;
mod api_client;
mod data_status_monitor;
mod news_service;
mod product_feed;

pub use admin_service::*;
pub use api_client::*;
pub use data_status_monitor::*;
pub use news_service::*;
pub use product_feed::*;
