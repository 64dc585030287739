//! Earnings aggregation and text rendering.
//!
//! Amounts are rendered with 8 fractional digits, fiat values with 2.

use crate::window::{format_clock, format_timestamp};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use trustpool_core::{Coin, PayoutRecord, WorkerRecord};
use trustpool_feeds::{price_or_zero, SpotPrices};

/// Settings that shape every report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Coins to report on, in display order
    pub coins: Vec<Coin>,
    /// Fiat currency code (e.g. "USD")
    pub fiat: String,
    /// Offset of the local day used for "today"
    pub utc_offset: FixedOffset,
    /// Label printed after local times
    pub tz_label: String,
    /// Number of hourly chart points fetched for window sums
    pub chart_size: u32,
    /// Payouts listed per coin
    pub payouts_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            coins: vec![Coin::BTC],
            fiat: "USD".to_string(),
            utc_offset: FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
            tz_label: "MSK".to_string(),
            // Ten days of hourly buckets
            chart_size: 240,
            payouts_limit: 10,
        }
    }
}

/// Earnings of one coin over some window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinEarnings {
    pub coin: Coin,
    pub amount: f64,
    /// `amount` times the spot price, 0 when the price is unknown
    pub fiat_value: f64,
    /// Epoch seconds of the payout the window starts at, if any
    pub last_payout: Option<i64>,
}

/// Per-coin earnings with a fiat grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSummary {
    pub rows: Vec<CoinEarnings>,
}

impl EarningsSummary {
    /// Convert per-coin amounts to fiat using `prices`.
    pub fn new(amounts: &[(Coin, f64)], prices: &SpotPrices) -> Self {
        let rows = amounts
            .iter()
            .map(|&(coin, amount)| CoinEarnings {
                coin,
                amount,
                fiat_value: amount * price_or_zero(prices, coin),
                last_payout: None,
            })
            .collect();
        Self { rows }
    }

    /// Attach the payout each coin's window started at.
    pub fn with_last_payouts(mut self, last_payouts: &[(Coin, Option<i64>)]) -> Self {
        for row in &mut self.rows {
            row.last_payout = last_payouts
                .iter()
                .find(|(coin, _)| *coin == row.coin)
                .and_then(|(_, ts)| *ts);
        }
        self
    }

    /// Sum of fiat values across all rows.
    pub fn total_fiat(&self) -> f64 {
        self.rows.iter().map(|r| r.fiat_value).sum()
    }
}

fn earnings_line(row: &CoinEarnings, fiat: &str) -> String {
    format!(
        "• {}: {:.8} ≈ {:.2} {}",
        row.coin, row.amount, row.fiat_value, fiat
    )
}

fn total_line(summary: &EarningsSummary, fiat: &str) -> String {
    format!("Total ≈ {:.2} {}", summary.total_fiat(), fiat)
}

/// Earnings from local midnight until now.
pub fn render_today(summary: &EarningsSummary, start: i64, end: i64, config: &ReportConfig) -> String {
    let mut lines = vec![
        format!("📅 Earnings today ({})", config.tz_label),
        format!(
            "from {} to {}:",
            format_clock(start, config.utc_offset, &config.tz_label),
            format_clock(end, config.utc_offset, &config.tz_label)
        ),
    ];
    lines.extend(summary.rows.iter().map(|r| earnings_line(r, &config.fiat)));
    lines.push(total_line(summary, &config.fiat));
    lines.join("\n")
}

/// Earnings since each coin's most recent payout.
pub fn render_since_payout(summary: &EarningsSummary, config: &ReportConfig) -> String {
    let mut lines = vec!["💸 Earnings since last payout:".to_string()];
    for row in &summary.rows {
        let last = format_timestamp(
            row.last_payout.unwrap_or(0),
            config.utc_offset,
            &config.tz_label,
        );
        lines.push(format!(
            "{} (last payout: {})",
            earnings_line(row, &config.fiat),
            last
        ));
    }
    lines.push(total_line(summary, &config.fiat));
    lines.join("\n")
}

/// Pool-reported revenue over the last 24 hours.
pub fn render_revenue_24h(summary: &EarningsSummary, config: &ReportConfig) -> String {
    let mut lines = vec!["📈 Revenue, last 24h:".to_string()];
    lines.extend(summary.rows.iter().map(|r| earnings_line(r, &config.fiat)));
    lines.push(total_line(summary, &config.fiat));
    lines.join("\n")
}

/// Worker counts and per-worker hashrates.
pub fn render_hashrate(workers: &[WorkerRecord]) -> String {
    let online = workers.iter().filter(|w| w.is_online()).count();
    let offline = workers.len() - online;

    let mut lines = vec![format!("⚙️ Workers: online {}, offline {}", online, offline)];
    lines.extend(workers.iter().map(|w| {
        format!(
            "• {}: {} (24h {}) — {}",
            w.alias, w.recent_hashrate, w.hashrate_1day, w.coin
        )
    }));
    lines.join("\n")
}

/// Recent payouts grouped by coin.
pub fn render_payouts(groups: &[(Coin, Vec<PayoutRecord>)], config: &ReportConfig) -> String {
    let mut lines = Vec::new();
    for (coin, payouts) in groups {
        lines.push(format!("🧾 Latest payouts {}:", coin));
        if payouts.is_empty() {
            lines.push("• no data".to_string());
        }
        for p in payouts {
            lines.push(format!(
                "• {}: {:.8} {}",
                format_timestamp(p.time, config.utc_offset, &config.tz_label),
                p.amount,
                coin
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}
