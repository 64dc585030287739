//! Alert evaluation: offline workers and new payouts.

use crate::db::{DbError, StateStore};
use serde::{Deserialize, Serialize};
use tracing::info;
use trustpool_core::{latest_payout, PayoutRecord, WorkerRecord};

/// Key of the persisted last-seen payout marker.
pub const LAST_PAYOUT_KEY: &str = "last_payout_ts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    Offline,
    Payout,
}

/// One alert, rendered and ready to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: String,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Workers silent for longer than `threshold_min` minutes, or never active.
pub fn check_offline(workers: &[WorkerRecord], threshold_min: i64, now: i64) -> Vec<AlertEvent> {
    workers
        .iter()
        .filter(|w| {
            w.minutes_since_active(now)
                .map_or(true, |mins| mins > threshold_min as f64)
        })
        .map(|w| {
            AlertEvent::new(
                AlertKind::Offline,
                format!("⚠️ {} offline > {} min", w.alias, threshold_min),
            )
        })
        .collect()
}

/// Compare the most recent payout with the persisted marker.
///
/// Emits at most one event and moves the marker forward when the latest
/// payout differs from the one seen last time.
pub async fn check_payouts(
    payouts: &[PayoutRecord],
    store: &dyn StateStore,
) -> Result<Vec<AlertEvent>, DbError> {
    let Some(latest) = latest_payout(payouts) else {
        return Ok(Vec::new());
    };

    let marker = latest.marker();
    if marker.is_empty() {
        return Ok(Vec::new());
    }

    let last_seen = store.get(LAST_PAYOUT_KEY).await?;
    if last_seen.as_deref() == Some(marker.as_str()) {
        return Ok(Vec::new());
    }

    store.set(LAST_PAYOUT_KEY, &marker).await?;
    info!(
        coin = %latest.coin,
        marker = %marker,
        previous = ?last_seen,
        "New payout detected"
    );

    Ok(vec![AlertEvent::new(
        AlertKind::Payout,
        format!("✅ Payout: {:.8} {}", latest.amount, latest.coin),
    )])
}

/// Render events as one broadcast message, `None` when there is nothing to say.
pub fn format_alerts(events: &[AlertEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let mut text = String::from("🚨 Alerts:");
    for event in events {
        text.push_str("\n• ");
        text.push_str(&event.message);
    }
    Some(text)
}
