//! Periodic alert check and broadcast.

use crate::config::NotifierConfig;
use crate::db::{DbError, StateStore};
use crate::evaluator::{check_offline, check_payouts, format_alerts, AlertEvent};
use crate::telegram::{broadcast, MessageSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use trustpool_core::PayoutRecord;
use trustpool_feeds::PoolApi;

/// Polls the pool and pushes offline and payout alerts to configured chats.
pub struct Notifier {
    api: Arc<dyn PoolApi>,
    store: Arc<dyn StateStore>,
    config: NotifierConfig,
}

impl Notifier {
    /// Create a new notifier.
    pub fn new(api: Arc<dyn PoolApi>, store: Arc<dyn StateStore>, config: NotifierConfig) -> Self {
        Self { api, store, config }
    }

    /// Payout history of the first configured coin that has any.
    async fn first_payout_stream(&self) -> Vec<PayoutRecord> {
        for &coin in &self.config.coins {
            match self.api.payouts(coin).await {
                Ok(payouts) if !payouts.is_empty() => return payouts,
                Ok(_) => debug!(coin = %coin, "No payout history"),
                Err(e) => warn!(coin = %coin, error = %e, "Failed to fetch payouts"),
            }
        }
        Vec::new()
    }

    /// Run the enabled checks once.
    pub async fn collect_events(&self, now: i64) -> Result<Vec<AlertEvent>, DbError> {
        let workers = self.api.worker_stats(&self.config.coins).await;
        let mut events = check_offline(&workers, self.config.offline_threshold_min, now);

        if !self.config.only_offline_alerts {
            let payouts = self.first_payout_stream().await;
            events.extend(check_payouts(&payouts, self.store.as_ref()).await?);
        }

        Ok(events)
    }

    /// One polling cycle: evaluate and broadcast. Returns the number of events.
    pub async fn poll_and_alert(&self, sink: &dyn MessageSink, now: i64) -> usize {
        let events = match self.collect_events(now).await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Alert check failed");
                return 0;
            }
        };

        if let Some(text) = format_alerts(&events) {
            let delivered = broadcast(sink, &self.config.chat_ids, &text).await;
            info!(
                events = events.len(),
                delivered = delivered,
                recipients = self.config.chat_ids.len(),
                "Alerts sent"
            );
        } else {
            debug!("No alerts");
        }

        events.len()
    }

    /// Poll forever on a fixed interval, first run after `first_delay`.
    ///
    /// Ticks that fall behind are delayed; cycles never overlap.
    pub async fn run(
        self: Arc<Self>,
        sink: Arc<dyn MessageSink>,
        interval: Duration,
        first_delay: Duration,
    ) {
        info!(
            interval_secs = interval.as_secs(),
            first_delay_secs = first_delay.as_secs(),
            "Alert loop started"
        );

        let start = tokio::time::Instant::now() + first_delay;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp();
            self.poll_and_alert(sink.as_ref(), now).await;
        }
    }
}
