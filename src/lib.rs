//! playguide - curation and activation engine for a children's game catalog
//!
//! ## Layout
//!
//! - `curation` - pure policy: safety gates, trust tiers, activation,
//!   badges, age bands, slugs
//! - `db` - SQLite store, curation write path, listing read model
//! - `links` - scheduled link health monitor
//! - `enhance` - boundary to the external copy enhancement service
//! - `discovery` - featured, related and detail read models
//! - `api` - axum HTTP surface
//!
//! The operating mode (`SYSTEM_MODE`) is read once at startup and passed
//! into every activation decision.

pub mod api;
pub mod config;
pub mod curation;
pub mod db;
pub mod discovery;
pub mod enhance;
pub mod error;
pub mod links;

pub use config::Config;
pub use curation::SystemMode;
pub use db::CatalogDb;
pub use error::CatalogError;
