//! Modhub - catalog core for user-submitted game mods.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Record models, filter engine, document stores, repositories
//! - `cache` - Moka-backed lookup cache for mods
//! - `services` - Tag reconciliation and engagement updates
//! - `catalog` - Backend selection and store wiring

pub mod cache;
pub mod catalog;
pub mod config;
pub mod database;
pub mod services;

pub use catalog::{Catalog, CatalogSummary};
pub use config::Config;
