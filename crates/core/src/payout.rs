//! Payout records reported by the pool.

use crate::Coin;
use serde::{Deserialize, Serialize};

/// A single payout transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub coin: Coin,
    /// Epoch seconds
    pub time: i64,
    pub amount: f64,
    /// Transaction id, empty when the pool does not report one
    pub txid: String,
}

impl PayoutRecord {
    pub fn new(coin: Coin, time: i64, amount: f64) -> Self {
        Self {
            coin,
            time,
            amount,
            txid: String::new(),
        }
    }

    /// Marker string used to remember the last payout seen.
    ///
    /// Empty when the record carries no timestamp.
    pub fn marker(&self) -> String {
        if self.time == 0 {
            String::new()
        } else {
            self.time.to_string()
        }
    }
}

/// Pick the most recent payout from a list.
pub fn latest_payout(payouts: &[PayoutRecord]) -> Option<&PayoutRecord> {
    payouts.iter().max_by_key(|p| p.time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker() {
        assert_eq!(PayoutRecord::new(Coin::BTC, 1_700_000_000, 0.1).marker(), "1700000000");
        assert_eq!(PayoutRecord::new(Coin::BTC, 0, 0.1).marker(), "");
    }

    #[test]
    fn test_latest_payout() {
        let payouts = vec![
            PayoutRecord::new(Coin::LTC, 1_700_003_600, 0.2),
            PayoutRecord::new(Coin::LTC, 1_700_007_200, 0.3),
            PayoutRecord::new(Coin::LTC, 1_700_000_000, 0.1),
        ];
        let latest = latest_payout(&payouts).unwrap();
        assert_eq!(latest.time, 1_700_007_200);
        assert!(latest_payout(&[]).is_none());
    }
}
