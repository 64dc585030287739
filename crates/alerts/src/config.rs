//! Alert configuration types.

use serde::{Deserialize, Serialize};
use trustpool_core::Coin;

/// Settings for the periodic alert check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Coins to check, in priority order for the payout check
    pub coins: Vec<Coin>,
    /// Minutes without a share before a worker counts as offline
    pub offline_threshold_min: i64,
    /// Skip the payout check and only report offline workers.
    ///
    /// Defaults to `false`, so payout alerts are sent unless this is set.
    /// Older releases of this bot read the flag the other way round
    /// and sent no payout alerts by default; set `ONLY_OFFLINE_ALERTS=true`
    /// to keep that behaviour.
    pub only_offline_alerts: bool,
    /// Telegram chats receiving alert broadcasts
    pub chat_ids: Vec<i64>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            coins: vec![Coin::BTC],
            offline_threshold_min: 10,
            only_offline_alerts: false,
            chat_ids: Vec::new(),
        }
    }
}
