//! Worker records reported by the pool.

use crate::Coin;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Snapshot of a single worker, fetched fresh on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub coin: Coin,
    /// Name as reported upstream
    pub name: CompactString,
    /// Display name after alias resolution
    pub alias: CompactString,
    /// Epoch seconds of last share, 0 if never active
    pub last_active: i64,
    pub status: CompactString,
    pub recent_hashrate: CompactString,
    pub hashrate_10min: CompactString,
    pub hashrate_1hour: CompactString,
    pub hashrate_1day: CompactString,
    pub reject_rate: CompactString,
}

impl WorkerRecord {
    /// Create a record with default hashrate fields, mostly for tests.
    pub fn new(coin: Coin, name: &str, last_active: i64) -> Self {
        Self {
            coin,
            name: CompactString::new(name),
            alias: CompactString::new(name),
            last_active,
            status: CompactString::new("unknown"),
            recent_hashrate: CompactString::new("0"),
            hashrate_10min: CompactString::new("0"),
            hashrate_1hour: CompactString::new("0"),
            hashrate_1day: CompactString::new("0"),
            reject_rate: CompactString::new("0"),
        }
    }

    /// Whether the pool reports this worker as active.
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    /// Minutes elapsed since the last share, `None` if never active.
    ///
    /// A non-positive `last_active` counts as never active.
    pub fn minutes_since_active(&self, now: i64) -> Option<f64> {
        if self.last_active <= 0 {
            return None;
        }
        Some(now.saturating_sub(self.last_active) as f64 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_online() {
        let mut worker = WorkerRecord::new(Coin::BTC, "rig1", 0);
        assert!(!worker.is_online());
        worker.status = CompactString::new("ACTIVE");
        assert!(worker.is_online());
        worker.status = CompactString::new("inactive");
        assert!(!worker.is_online());
    }

    #[test]
    fn test_minutes_since_active() {
        let worker = WorkerRecord::new(Coin::LTC, "rig1", 1_700_000_000);
        assert_eq!(worker.minutes_since_active(1_700_000_900), Some(15.0));

        let never = WorkerRecord::new(Coin::LTC, "rig2", 0);
        assert_eq!(never.minutes_since_active(1_700_000_900), None);
    }

    #[test]
    fn test_minutes_since_active_extreme_values() {
        let negative = WorkerRecord::new(Coin::BTC, "rig", i64::MIN);
        assert_eq!(negative.minutes_since_active(1_700_000_000), None);

        let far_future = WorkerRecord::new(Coin::BTC, "rig", i64::MAX);
        assert_eq!(
            far_future.minutes_since_active(i64::MIN),
            Some(i64::MIN as f64 / 60.0)
        );
    }
}
