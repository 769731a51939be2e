//! REST client and product feed tests against a mock HTTP server

mod client;
mod product_feed;
