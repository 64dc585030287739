//! Telegram delivery and alerting for the Trustpool bot.
//!
//! This crate provides:
//! - SQLite-backed key-value state (last payout seen)
//! - Offline and payout alert evaluation
//! - Telegram bot integration for reports and broadcasts

pub mod config;
pub mod db;
pub mod evaluator;
pub mod notifier;
pub mod telegram;

pub use config::NotifierConfig;
pub use db::{Database, DbError, StateStore};
pub use evaluator::{AlertEvent, AlertKind};
pub use notifier::Notifier;
pub use telegram::{broadcast, Action, MessageSink, TelegramBot, TelegramError};
