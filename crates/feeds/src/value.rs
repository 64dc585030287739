//! Lenient numeric coercion for loosely typed upstream JSON.
//!
//! The observer API mixes JSON numbers and numeric strings, sometimes with a
//! decimal comma. Anything that does not coerce yields `None`; callers decide
//! whether that drops the record or falls back to a default.

use serde_json::Value;

/// Raw timestamps above this are taken to be milliseconds since the epoch.
pub const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Convert a millisecond timestamp to seconds, leaving seconds untouched.
pub fn normalize_timestamp(raw: i64) -> i64 {
    if raw > MILLIS_THRESHOLD {
        raw / 1000
    } else {
        raw
    }
}

/// Coerce a JSON value into a finite float.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Coerce a JSON value into an integer, truncating fractional parts.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.replace(',', ".").parse::<f64>().ok().and_then(float_to_i64))
        }
        _ => None,
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Coerce a timestamp field, correcting millisecond values.
pub fn coerce_timestamp(value: &Value) -> Option<i64> {
    coerce_i64(value).map(normalize_timestamp)
}

/// First of `keys` whose value coerces with `f`.
pub fn first_coerced<T>(
    obj: &Value,
    keys: &[&str],
    f: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().find_map(|k| obj.get(*k).and_then(&f))
}

/// First of `keys` holding a non-empty string or a number, rendered as text.
pub fn first_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
