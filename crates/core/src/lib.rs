//! Core data types for the Trustpool notification bot.

pub mod alias;
pub mod chart;
pub mod coin;
pub mod payout;
pub mod worker;

pub use alias::*;
pub use chart::*;
pub use coin::*;
pub use payout::*;
pub use worker::*;
