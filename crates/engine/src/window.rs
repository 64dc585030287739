//! Local-day time windows and timestamp rendering.

use chrono::{DateTime, FixedOffset};

const DAY_SECS: i64 = 86_400;

/// Epoch second of the most recent local midnight at or before `now`.
pub fn local_day_start(now: i64, offset: FixedOffset) -> i64 {
    let shift = offset.local_minus_utc() as i64;
    (now + shift).div_euclid(DAY_SECS) * DAY_SECS - shift
}

/// Window from local midnight to `now`, both inclusive.
pub fn local_day_window(now: i64, offset: FixedOffset) -> (i64, i64) {
    (local_day_start(now, offset), now)
}

/// Render an epoch second as `YYYY-MM-DD HH:MM <label>`, or `—` when unset.
pub fn format_timestamp(ts: i64, offset: FixedOffset, label: &str) -> String {
    match DateTime::from_timestamp(ts, 0).filter(|_| ts != 0) {
        Some(dt) => format!(
            "{} {}",
            dt.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            label
        ),
        None => "—".to_string(),
    }
}

/// Render only the local `HH:MM <label>` part.
pub fn format_clock(ts: i64, offset: FixedOffset, label: &str) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => format!("{} {}", dt.with_timezone(&offset).format("%H:%M"), label),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_local_day_start_msk() {
        // 2023-11-14 22:13:20 UTC is 2023-11-15 01:13:20 MSK
        let now = 1_700_000_000;
        let start = local_day_start(now, msk());
        // 2023-11-15 00:00 MSK = 2023-11-14 21:00 UTC
        assert_eq!(start, 1_699_995_600);
    }

    #[test]
    fn test_local_day_start_utc() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(local_day_start(1_700_000_000, utc), 1_699_920_000);
        assert_eq!(local_day_start(1_699_920_000, utc), 1_699_920_000);
    }

    #[test]
    fn test_local_day_window() {
        assert_eq!(
            local_day_window(1_700_000_000, msk()),
            (1_699_995_600, 1_700_000_000)
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_700_000_000, msk(), "MSK"),
            "2023-11-15 01:13 MSK"
        );
        assert_eq!(format_timestamp(0, msk(), "MSK"), "—");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1_699_995_600, msk(), "MSK"), "00:00 MSK");
    }
}
