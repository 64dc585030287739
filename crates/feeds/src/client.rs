//! Trustpool observer API client.
//!
//! Endpoints:
//! - `/observer/home?coin=BTC`
//! - `/observer/worker?coin=BTC&group_id=-1`
//! - `/observer/payment/detail?coin=BTC`
//! - `/observer/profit/chart?coin=BTC&range_type=hour&size=168`
//!
//! Every call carries the access key as a query parameter.

use crate::chart::normalize_chart;
use crate::error::FeedError;
use crate::value::{coerce_f64, coerce_timestamp, first_coerced, first_text};
use async_trait::async_trait;
use compact_str::CompactString;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use trustpool_core::{AliasTables, ChartPoint, Coin, Granularity, PayoutRecord, WorkerRecord};

pub const DEFAULT_BASE_URL: &str = "https://trustpool.ru/res/saas";

/// Worker list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFilter {
    /// Worker group, -1 for all groups
    pub group_id: i64,
    /// Upstream status filter (e.g. "active"), `None` for all
    pub status: Option<String>,
}

impl Default for WorkerFilter {
    fn default() -> Self {
        Self {
            group_id: -1,
            status: None,
        }
    }
}

/// Read-only view of the pool's reporting API.
#[async_trait]
pub trait PoolApi: Send + Sync {
    /// Profit of the last 24 hours from the account summary.
    async fn profit_24h(&self, coin: Coin) -> Result<f64, FeedError>;

    /// Workers mining `coin`, with aliases resolved.
    async fn workers(&self, coin: Coin, filter: &WorkerFilter)
        -> Result<Vec<WorkerRecord>, FeedError>;

    /// Payout history, most recent first as delivered by the pool.
    async fn payouts(&self, coin: Coin) -> Result<Vec<PayoutRecord>, FeedError>;

    /// Profit chart normalized into `(epoch_seconds, profit)` points.
    async fn profit_chart(
        &self,
        coin: Coin,
        granularity: Granularity,
        size: u32,
    ) -> Result<Vec<ChartPoint>, FeedError>;

    /// Workers of every coin in order. A failed coin contributes nothing.
    async fn worker_stats(&self, coins: &[Coin]) -> Vec<WorkerRecord> {
        let mut all = Vec::new();
        for &coin in coins {
            match self.workers(coin, &WorkerFilter::default()).await {
                Ok(workers) => all.extend(workers),
                Err(e) => warn!(coin = %coin, error = %e, "Failed to fetch workers"),
            }
        }
        all
    }

    /// Up to `limit` payouts, empty on failure.
    async fn recent_payouts(&self, coin: Coin, limit: usize) -> Vec<PayoutRecord> {
        match self.payouts(coin).await {
            Ok(mut payouts) => {
                payouts.truncate(limit);
                payouts
            }
            Err(e) => {
                warn!(coin = %coin, error = %e, "Failed to fetch payouts");
                Vec::new()
            }
        }
    }
}

/// Connection settings for [`PoolClient`].
#[derive(Debug, Clone)]
pub struct PoolClientConfig {
    pub base_url: String,
    pub access_key: String,
    pub timeout: Duration,
}

impl Default for PoolClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: String::new(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// HTTP client for the observer API.
pub struct PoolClient {
    http: reqwest::Client,
    base: String,
    access_key: String,
    aliases: AliasTables,
}

impl PoolClient {
    /// Create a client. Fails if the base URL does not parse.
    pub fn new(config: PoolClientConfig, aliases: AliasTables) -> Result<Self, FeedError> {
        let base = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base)?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base,
            access_key: config.access_key,
            aliases,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FeedError> {
        let url = format!("{}{}", self.base, path);
        debug!(path = path, "Pool API request");

        let response = self
            .http
            .get(&url)
            .query(&[("access_key", self.access_key.as_str())])
            .query(params)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl PoolApi for PoolClient {
    async fn profit_24h(&self, coin: Coin) -> Result<f64, FeedError> {
        let json = self
            .get("/observer/home", &[("coin", coin.to_string())])
            .await?;
        Ok(parse_profit_24h(&json))
    }

    async fn workers(
        &self,
        coin: Coin,
        filter: &WorkerFilter,
    ) -> Result<Vec<WorkerRecord>, FeedError> {
        let mut params = vec![
            ("coin", coin.to_string()),
            ("group_id", filter.group_id.to_string()),
        ];
        if let Some(status) = &filter.status {
            params.push(("status", status.clone()));
        }
        let json = self.get("/observer/worker", &params).await?;
        Ok(parse_workers(&json, coin, &self.aliases))
    }

    async fn payouts(&self, coin: Coin) -> Result<Vec<PayoutRecord>, FeedError> {
        let json = self
            .get("/observer/payment/detail", &[("coin", coin.to_string())])
            .await?;
        Ok(parse_payouts(&json, coin))
    }

    async fn profit_chart(
        &self,
        coin: Coin,
        granularity: Granularity,
        size: u32,
    ) -> Result<Vec<ChartPoint>, FeedError> {
        let params = [
            ("coin", coin.to_string()),
            ("range_type", granularity.as_range_type().to_string()),
            ("size", size.to_string()),
        ];
        let json = self.get("/observer/profit/chart", &params).await?;
        Ok(normalize_chart(&json, granularity))
    }
}

/// The record list of a `{"data": {"data": [...]}}` or `{"data": [...]}` response.
fn envelope_list(json: &Value) -> &[Value] {
    let data = &json["data"];
    data["data"]
        .as_array()
        .or_else(|| data.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `profit_24hour` from the home summary, 0 when absent or malformed.
pub fn parse_profit_24h(json: &Value) -> f64 {
    coerce_f64(&json["data"]["profit_24hour"]).unwrap_or(0.0)
}

/// Parse the worker list, resolving display aliases.
pub fn parse_workers(json: &Value, coin: Coin, aliases: &AliasTables) -> Vec<WorkerRecord> {
    envelope_list(json)
        .iter()
        .filter(|w| w.is_object())
        .map(|w| {
            let coin = w["coin"].as_str().and_then(Coin::parse).unwrap_or(coin);
            let name = first_text(w, &["name", "worker"]).unwrap_or_else(|| "unknown".to_string());
            let alias = aliases.resolve(coin, &name);
            let text = |key: &str, default: &str| {
                CompactString::from(first_text(w, &[key]).as_deref().unwrap_or(default))
            };

            WorkerRecord {
                coin,
                alias: CompactString::from(alias),
                last_active: coerce_timestamp(&w["last_active"])
                    .filter(|t| *t > 0)
                    .unwrap_or(0),
                status: text("status", "unknown"),
                recent_hashrate: text("recent_hashrate", "0"),
                hashrate_10min: text("hashrate_10min", "0"),
                hashrate_1hour: text("hashrate_1hour", "0"),
                hashrate_1day: text("hashrate_1day", "0"),
                reject_rate: text("reject_rate", "0"),
                name: CompactString::from(name),
            }
        })
        .collect()
}

/// Parse the payout list. Records without a usable time or amount are dropped.
pub fn parse_payouts(json: &Value, coin: Coin) -> Vec<PayoutRecord> {
    envelope_list(json)
        .iter()
        .filter_map(|p| {
            let time = first_coerced(p, &["time", "timestamp"], coerce_timestamp)?;
            let amount = coerce_f64(&p["amount"])?;
            Some(PayoutRecord {
                coin: p["coin"].as_str().and_then(Coin::parse).unwrap_or(coin),
                time,
                amount,
                txid: first_text(p, &["txid", "txId", "hash"]).unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_client_rejects_bad_base_url() {
        let config = PoolClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            PoolClient::new(config, AliasTables::new()),
            Err(FeedError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let config = PoolClientConfig {
            base_url: "https://pool.example/res/saas/".to_string(),
            ..Default::default()
        };
        let client = PoolClient::new(config, AliasTables::new()).unwrap();
        assert_eq!(client.base, "https://pool.example/res/saas");
    }

    #[test]
    fn test_parse_profit_24h() {
        assert_eq!(parse_profit_24h(&json!({"data": {"profit_24hour": "0,0012"}})), 0.0012);
        assert_eq!(parse_profit_24h(&json!({"data": {"profit_24hour": 0.5}})), 0.5);
        assert_eq!(parse_profit_24h(&json!({"data": {}})), 0.0);
        assert_eq!(parse_profit_24h(&json!({"code": 401})), 0.0);
    }

    #[test]
    fn test_parse_workers_resolves_aliases() {
        let mut aliases = AliasTables::new();
        aliases.insert_scoped(Coin::BTC, "Rig__1", "Office Rig");

        let json = json!({
            "data": { "data": [
                {
                    "name": "Rig #1",
                    "last_active": 1_700_000_000,
                    "status": "active",
                    "recent_hashrate": "110 TH/s",
                    "hashrate_1day": "105 TH/s",
                    "reject_rate": "0.01%"
                },
                { "worker": "garage", "coin": "ltc", "last_active": "1700000000000" },
                { "last_active": null },
                "junk"
            ]}
        });

        let workers = parse_workers(&json, Coin::BTC, &aliases);
        assert_eq!(workers.len(), 3);

        assert_eq!(workers[0].alias, "Office Rig");
        assert_eq!(workers[0].name, "Rig #1");
        assert_eq!(workers[0].status, "active");
        assert_eq!(workers[0].hashrate_10min, "0");
        assert_eq!(workers[0].hashrate_1day, "105 TH/s");

        assert_eq!(workers[1].coin, Coin::LTC);
        assert_eq!(workers[1].alias, "garage");
        assert_eq!(workers[1].last_active, 1_700_000_000);
        assert_eq!(workers[1].status, "unknown");

        assert_eq!(workers[2].name, "unknown");
        assert_eq!(workers[2].last_active, 0);
    }

    #[test]
    fn test_parse_workers_flat_envelope() {
        let json = json!({ "data": [ { "name": "a" } ] });
        assert_eq!(parse_workers(&json, Coin::DOGE, &AliasTables::new()).len(), 1);
        assert!(parse_workers(&json!({}), Coin::DOGE, &AliasTables::new()).is_empty());
    }

    #[test]
    fn test_parse_workers_negative_last_active_is_never() {
        let json = json!({ "data": { "data": [
            { "name": "x", "last_active": "-9223372036854775808" },
            { "name": "y", "last_active": -5 }
        ] } });
        let workers = parse_workers(&json, Coin::BTC, &AliasTables::new());
        let last_active: Vec<i64> = workers.iter().map(|w| w.last_active).collect();
        assert_eq!(last_active, vec![0, 0]);
        assert_eq!(workers[0].minutes_since_active(1_700_000_000), None);
    }

    #[test]
    fn test_parse_payouts() {
        let json = json!({
            "data": { "data": [
                { "time": 1_700_003_600, "amount": "0,00123", "txid": "abc" },
                { "timestamp": "1700000000", "amount": 0.001, "hash": "def", "coin": "BTC" },
                { "time": 1_699_990_000, "amount": "pending" },
                { "amount": 0.5 }
            ]}
        });

        let payouts = parse_payouts(&json, Coin::LTC);
        assert_eq!(
            payouts,
            vec![
                PayoutRecord {
                    coin: Coin::LTC,
                    time: 1_700_003_600,
                    amount: 0.00123,
                    txid: "abc".to_string(),
                },
                PayoutRecord {
                    coin: Coin::BTC,
                    time: 1_700_000_000,
                    amount: 0.001,
                    txid: "def".to_string(),
                },
            ]
        );
    }

    struct FlakyApi;

    #[async_trait]
    impl PoolApi for FlakyApi {
        async fn profit_24h(&self, _coin: Coin) -> Result<f64, FeedError> {
            Ok(0.0)
        }

        async fn workers(
            &self,
            coin: Coin,
            _filter: &WorkerFilter,
        ) -> Result<Vec<WorkerRecord>, FeedError> {
            match coin {
                Coin::LTC => Err(FeedError::Timeout("slow".into())),
                _ => Ok(vec![WorkerRecord::new(coin, "rig", 1)]),
            }
        }

        async fn payouts(&self, coin: Coin) -> Result<Vec<PayoutRecord>, FeedError> {
            match coin {
                Coin::BTC => Ok((0..15).map(|i| PayoutRecord::new(coin, i, 0.1)).collect()),
                _ => Err(FeedError::Status(500)),
            }
        }

        async fn profit_chart(
            &self,
            _coin: Coin,
            _granularity: Granularity,
            _size: u32,
        ) -> Result<Vec<ChartPoint>, FeedError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_worker_stats_skips_failed_coin() {
        let workers = FlakyApi.worker_stats(&[Coin::BTC, Coin::LTC, Coin::DOGE]).await;
        let coins: Vec<Coin> = workers.iter().map(|w| w.coin).collect();
        assert_eq!(coins, vec![Coin::BTC, Coin::DOGE]);
    }

    #[tokio::test]
    async fn test_recent_payouts_truncates_and_degrades() {
        assert_eq!(FlakyApi.recent_payouts(Coin::BTC, 10).await.len(), 10);
        assert!(FlakyApi.recent_payouts(Coin::LTC, 10).await.is_empty());
    }
}
