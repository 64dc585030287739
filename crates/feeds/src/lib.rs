//! Upstream data sources for the Trustpool bot.
//!
//! This crate provides clients for the pool's observer API and the spot
//! price API, plus the parsing that turns their loosely typed JSON into
//! core records.
//!
//! ## Architecture
//!
//! - `client` - Observer API client and the `PoolApi` seam
//! - `chart` - Profit chart shape detection and normalization
//! - `prices` - Spot price quotes and the `PriceSource` seam
//! - `value` - Lenient numeric coercion and timestamp unit correction

pub mod chart;
pub mod client;
pub mod error;
pub mod prices;
pub mod value;

pub use chart::*;
pub use client::*;
pub use error::*;
pub use prices::*;
pub use value::normalize_timestamp;
