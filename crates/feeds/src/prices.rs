//! Spot price quotes for converting mined coins into fiat.
//!
//! Uses CoinGecko's public `simple/price` endpoint.

use crate::error::FeedError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use trustpool_core::Coin;

/// Spot price per coin in one fiat currency.
pub type SpotPrices = HashMap<Coin, f64>;

/// Price of `coin`, 0 when unknown.
pub fn price_or_zero(prices: &SpotPrices, coin: Coin) -> f64 {
    prices.get(&coin).copied().unwrap_or(0.0)
}

/// Source of spot prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn spot_prices(&self, coins: &[Coin], fiat: &str) -> Result<SpotPrices, FeedError>;

    /// Spot prices, empty on failure.
    async fn spot_prices_or_empty(&self, coins: &[Coin], fiat: &str) -> SpotPrices {
        match self.spot_prices(coins, fiat).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(fiat = fiat, error = %e, "Failed to fetch spot prices");
                SpotPrices::new()
            }
        }
    }
}

/// CoinGecko price client.
pub struct CoinGeckoClient {
    http: reqwest::Client,
    url: String,
}

impl CoinGeckoClient {
    const URL: &'static str = "https://api.coingecko.com/api/v3/simple/price";

    pub fn new() -> Result<Self, FeedError> {
        Self::with_url(Self::URL)
    }

    pub fn with_url(url: &str) -> Result<Self, FeedError> {
        url::Url::parse(url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_prices(&self, coins: &[Coin], fiat: &str) -> Result<SpotPrices, FeedError> {
        if coins.is_empty() {
            return Ok(SpotPrices::new());
        }

        let ids = coins
            .iter()
            .map(|c| c.coingecko_id())
            .collect::<Vec<_>>()
            .join(",");
        let vs = fiat.to_lowercase();

        let response = self
            .http
            .get(&self.url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", vs.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let json: Value = response.json().await?;
        let prices = parse_simple_price(&json, coins, fiat);
        debug!(fiat = fiat, count = prices.len(), "Fetched spot prices");
        Ok(prices)
    }
}

/// Extract `{ "<id>": { "<fiat>": price } }` entries for the requested coins.
///
/// Missing, zero or non-numeric prices are left out.
pub fn parse_simple_price(json: &Value, coins: &[Coin], fiat: &str) -> SpotPrices {
    let vs = fiat.to_lowercase();
    coins
        .iter()
        .filter_map(|&coin| {
            let price = json[coin.coingecko_id()][vs.as_str()].as_f64()?;
            (price > 0.0).then_some((coin, price))
        })
        .collect()
}
