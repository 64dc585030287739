//! Profit chart normalization.
//!
//! The observer API returns profit charts in one of two shapes:
//!
//! - an implicit grid: a single `start` epoch and a flat list of numeric
//!   profits, one per bucket;
//! - explicit points: a list of objects, each carrying its own time and
//!   profit under one of several field names.
//!
//! [`ChartShape::detect`] decides the shape once, and
//! [`ChartShape::into_points`] turns it into `(epoch_seconds, profit)` pairs.
//! Malformed points are dropped; no zero-valued points are synthesized.

use crate::value::{coerce_f64, coerce_timestamp, first_coerced};
use serde_json::Value;
use trustpool_core::{ChartPoint, Granularity};

const TIME_KEYS: &[&str] = &["time", "ts", "date", "timestamp"];
const PROFIT_KEYS: &[&str] = &["profit", "value", "amount"];
const SERIES_KEYS: &[&str] = &["data", "list", "values"];

/// Chart payload shape, decided once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartShape<'a> {
    /// Fixed-step series starting at `start` (already in seconds).
    Grid { start: i64, values: &'a [Value] },
    /// Objects with their own time and profit fields.
    Points(&'a [Value]),
    /// Nothing usable in the payload.
    Empty,
}

impl<'a> ChartShape<'a> {
    /// Classify a full chart response (including the `data` envelope).
    pub fn detect(response: &'a Value) -> Self {
        let payload = match response.get("data") {
            Some(data) if !data.is_null() => data,
            _ => return ChartShape::Empty,
        };

        let series = match payload {
            Value::Array(items) => items.as_slice(),
            Value::Object(_) => match SERIES_KEYS
                .iter()
                .find_map(|k| payload.get(*k).and_then(Value::as_array))
            {
                Some(items) => items.as_slice(),
                None => return ChartShape::Empty,
            },
            _ => return ChartShape::Empty,
        };

        if series.is_empty() {
            return ChartShape::Empty;
        }

        let start = payload
            .get("start")
            .or_else(|| response.get("start"))
            .filter(|v| !v.is_null());

        let all_scalars = series.iter().all(|v| !v.is_object() && !v.is_array());

        match start {
            Some(start) if all_scalars => match coerce_timestamp(start) {
                Some(start) => ChartShape::Grid {
                    start,
                    values: series,
                },
                None => ChartShape::Empty,
            },
            _ => ChartShape::Points(series),
        }
    }

    /// Produce chart points in input order.
    pub fn into_points(self, granularity: Granularity) -> Vec<ChartPoint> {
        match self {
            ChartShape::Grid { start, values } => {
                let step = granularity.step_secs();
                values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| {
                        let profit = coerce_f64(v)?;
                        Some(ChartPoint::new(start + i as i64 * step, profit))
                    })
                    .collect()
            }
            ChartShape::Points(items) => items.iter().filter_map(parse_point).collect(),
            ChartShape::Empty => Vec::new(),
        }
    }
}

fn parse_point(item: &Value) -> Option<ChartPoint> {
    if !item.is_object() {
        return None;
    }
    let time = first_coerced(item, TIME_KEYS, coerce_timestamp).filter(|t| *t > 0)?;
    let profit = first_coerced(item, PROFIT_KEYS, coerce_f64)?;
    Some(ChartPoint::new(time, profit))
}

/// Normalize a chart response into points, oldest first as delivered.
pub fn normalize_chart(response: &Value, granularity: Granularity) -> Vec<ChartPoint> {
    ChartShape::detect(response).into_points(granularity)
}
