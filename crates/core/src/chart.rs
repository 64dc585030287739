//! Profit chart types.

use serde::{Deserialize, Serialize};

/// Bucket size of a profit chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Hour,
    Day,
}

impl Granularity {
    /// Value of the `range_type` query parameter.
    pub fn as_range_type(self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        }
    }

    /// Seconds between consecutive buckets.
    pub fn step_secs(self) -> i64 {
        match self {
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
        }
    }
}

/// Profit earned in one chart bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Epoch seconds at the start of the bucket
    pub time: i64,
    pub profit: f64,
}

impl ChartPoint {
    pub fn new(time: i64, profit: f64) -> Self {
        Self { time, profit }
    }
}

/// Sum the profit of every point inside the inclusive window `[start, end]`.
pub fn sum_profit_between(points: &[ChartPoint], start: i64, end: i64) -> f64 {
    points
        .iter()
        .filter(|p| start <= p.time && p.time <= end)
        .map(|p| p.profit)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(start: i64, profits: &[f64]) -> Vec<ChartPoint> {
        profits
            .iter()
            .enumerate()
            .map(|(i, &p)| ChartPoint::new(start + i as i64 * 3_600, p))
            .collect()
    }

    #[test]
    fn test_granularity() {
        assert_eq!(Granularity::Hour.as_range_type(), "hour");
        assert_eq!(Granularity::Day.as_range_type(), "day");
        assert_eq!(Granularity::Hour.step_secs(), 3_600);
        assert_eq!(Granularity::Day.step_secs(), 86_400);
    }

    #[test]
    fn test_sum_is_inclusive_on_both_ends() {
        let points = hourly(1_000, &[1.0, 2.0, 4.0, 8.0]);
        // Window covers exactly the 2nd and 3rd bucket
        assert_eq!(sum_profit_between(&points, 4_600, 8_200), 6.0);
        assert_eq!(sum_profit_between(&points, 1_000, 11_800), 15.0);
    }

    #[test]
    fn test_sum_excludes_points_outside_window() {
        let points = hourly(1_000, &[1.0, 2.0, 4.0]);
        assert_eq!(sum_profit_between(&points, 1_001, 4_599), 0.0);
    }

    #[test]
    fn test_sum_empty() {
        assert_eq!(sum_profit_between(&[], 0, i64::MAX), 0.0);
        let points = hourly(1_000, &[1.0]);
        // Inverted window selects nothing
        assert_eq!(sum_profit_between(&points, 2_000, 0), 0.0);
    }
}
