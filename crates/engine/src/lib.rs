//! Report engine.
//!
//! This crate turns pool data into the human-readable summaries sent to
//! chat users: windowed profit sums, fiat conversion and text rendering.

pub mod report;
pub mod reporter;
pub mod window;

pub use report::*;
pub use reporter::*;
pub use window::*;
