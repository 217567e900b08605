//! # Boxleo Proxy Library
//!
//! Authenticated proxy for the Boxleo courier API. Logs in once and caches
//! the bearer token, forwards paginated order listings, and reshapes orders
//! into a flat CSV export enriched with cached cancellation reasons.
//!
//! Modules:
//! - `config`: service configuration, defaults and validation
//! - `cache`: bearer token and cancellation reasons caches
//! - `sources`: login and authenticated upstream requests
//! - `parser`: order flattening and CSV encoding
//! - `server`: inbound HTTP routes

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::error::ProxyError;
