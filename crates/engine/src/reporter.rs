//! Report assembly from live pool and price data.
//!
//! Every upstream call is made sequentially. A failed call degrades the
//! figure it feeds to zero or empty; a report is always produced.

use crate::report::{
    render_hashrate, render_payouts, render_revenue_24h, render_since_payout, render_today,
    EarningsSummary, ReportConfig,
};
use crate::window::local_day_window;
use std::sync::Arc;
use tracing::{debug, warn};
use trustpool_core::{latest_payout, sum_profit_between, Coin, Granularity};
use trustpool_feeds::{PoolApi, PriceSource};

/// Which coins a payouts report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutScope {
    Single(Coin),
    All,
}

impl PayoutScope {
    /// A known coin symbol selects that coin; anything else means all coins.
    pub fn parse(s: &str) -> Self {
        match Coin::parse(s) {
            Some(coin) => PayoutScope::Single(coin),
            None => PayoutScope::All,
        }
    }
}

/// Builds the text reports served to chat users.
pub struct Reporter {
    api: Arc<dyn PoolApi>,
    prices: Arc<dyn PriceSource>,
    config: ReportConfig,
}

impl Reporter {
    pub fn new(api: Arc<dyn PoolApi>, prices: Arc<dyn PriceSource>, config: ReportConfig) -> Self {
        Self {
            api,
            prices,
            config,
        }
    }

    /// Profit of `coin` in `[start, end]` from the hourly chart, 0 on failure.
    pub async fn profit_between(&self, coin: Coin, start: i64, end: i64) -> f64 {
        match self
            .api
            .profit_chart(coin, Granularity::Hour, self.config.chart_size)
            .await
        {
            Ok(points) => {
                let sum = sum_profit_between(&points, start, end);
                debug!(coin = %coin, points = points.len(), sum = sum, "Summed chart window");
                sum
            }
            Err(e) => {
                warn!(coin = %coin, error = %e, "Failed to fetch profit chart");
                0.0
            }
        }
    }

    /// Earnings from local midnight to `now` (epoch seconds).
    pub async fn today(&self, now: i64) -> String {
        let (start, end) = local_day_window(now, self.config.utc_offset);
        let prices = self
            .prices
            .spot_prices_or_empty(&self.config.coins, &self.config.fiat)
            .await;

        let mut amounts = Vec::with_capacity(self.config.coins.len());
        for &coin in &self.config.coins {
            amounts.push((coin, self.profit_between(coin, start, end).await));
        }

        let summary = EarningsSummary::new(&amounts, &prices);
        render_today(&summary, start, end, &self.config)
    }

    /// Earnings since each coin's most recent payout up to `now`.
    pub async fn since_last_payout(&self, now: i64) -> String {
        let prices = self
            .prices
            .spot_prices_or_empty(&self.config.coins, &self.config.fiat)
            .await;

        let mut last_payouts = Vec::with_capacity(self.config.coins.len());
        for &coin in &self.config.coins {
            let payouts = self.api.recent_payouts(coin, usize::MAX).await;
            let last = latest_payout(&payouts).map(|p| p.time).filter(|t| *t > 0);
            last_payouts.push((coin, last));
        }

        let mut amounts = Vec::with_capacity(last_payouts.len());
        for &(coin, last) in &last_payouts {
            let amount = match last {
                Some(since) => self.profit_between(coin, since, now).await,
                None => 0.0,
            };
            amounts.push((coin, amount));
        }

        let summary = EarningsSummary::new(&amounts, &prices).with_last_payouts(&last_payouts);
        render_since_payout(&summary, &self.config)
    }

    /// Pool-reported 24h revenue per coin.
    pub async fn revenue_24h(&self) -> String {
        let prices = self
            .prices
            .spot_prices_or_empty(&self.config.coins, &self.config.fiat)
            .await;

        let mut amounts = Vec::with_capacity(self.config.coins.len());
        for &coin in &self.config.coins {
            let amount = self.api.profit_24h(coin).await.unwrap_or_else(|e| {
                warn!(coin = %coin, error = %e, "Failed to fetch account summary");
                0.0
            });
            amounts.push((coin, amount));
        }

        render_revenue_24h(&EarningsSummary::new(&amounts, &prices), &self.config)
    }

    /// Worker status overview.
    pub async fn hashrate(&self) -> String {
        let workers = self.api.worker_stats(&self.config.coins).await;
        render_hashrate(&workers)
    }

    /// Latest payouts for one coin or every configured coin.
    pub async fn payouts(&self, scope: PayoutScope) -> String {
        let coins = match scope {
            PayoutScope::Single(coin) => vec![coin],
            PayoutScope::All => self.config.coins.clone(),
        };

        let mut groups = Vec::with_capacity(coins.len());
        for coin in coins {
            let payouts = self
                .api
                .recent_payouts(coin, self.config.payouts_limit)
                .await;
            groups.push((coin, payouts));
        }

        render_payouts(&groups, &self.config)
    }
}
