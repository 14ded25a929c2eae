//! # PixAI Exporter Library
//!
//! Polls the PixAI account GraphQL API on a fixed interval and republishes
//! the remaining quota and the days until each access token expires as
//! Prometheus gauges.
//!
//! Modules:
//! - `config` — service configuration, loading and validation
//! - `sources` — GraphQL client for the account API
//! - `poller` — the scrape loop writing gauge values
//! - `observability` — metric registry and the `/metrics` route
//! - `server` — axum server serving scrapes

pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod poller;
pub mod server;
pub mod sources;
#[cfg(test)]
pub mod tests;
pub mod utils;

pub use crate::config::settings::ServiceConfig;
pub use crate::error::{ConfigurationError, UpstreamError};
