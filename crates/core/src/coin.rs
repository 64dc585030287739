//! Coins mined on the pool.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coin symbol could not be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown coin: {0}")]
pub struct UnknownCoin(pub String);

/// Coin supported by the pool's observer API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coin {
    /// Bitcoin
    BTC,
    /// Litecoin
    LTC,
    /// Dogecoin (merge-mined with LTC)
    DOGE,
}

impl Coin {
    /// All supported coins, in display order.
    pub const ALL: [Coin; 3] = [Coin::BTC, Coin::LTC, Coin::DOGE];

    /// Parse from a symbol, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Some(Coin::BTC),
            "LTC" => Some(Coin::LTC),
            "DOGE" => Some(Coin::DOGE),
            _ => None,
        }
    }

    /// Get the ticker symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Coin::BTC => "BTC",
            Coin::LTC => "LTC",
            Coin::DOGE => "DOGE",
        }
    }

    /// CoinGecko asset id used for spot price lookups.
    pub fn coingecko_id(self) -> &'static str {
        match self {
            Coin::BTC => "bitcoin",
            Coin::LTC => "litecoin",
            Coin::DOGE => "dogecoin",
        }
    }
}

impl std::str::FromStr for Coin {
    type Err = UnknownCoin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coin::parse(s).ok_or_else(|| UnknownCoin(s.to_string()))
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Coin::parse("BTC"), Some(Coin::BTC));
        assert_eq!(Coin::parse("ltc"), Some(Coin::LTC));
        assert_eq!(Coin::parse(" Doge "), Some(Coin::DOGE));
        assert_eq!(Coin::parse("ETH"), None);
        assert_eq!(Coin::parse(""), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "XMR".parse::<Coin>().unwrap_err();
        assert_eq!(err, UnknownCoin("XMR".to_string()));
        assert_eq!(err.to_string(), "Unknown coin: XMR");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Coin::BTC), "BTC");
        assert_eq!(format!("{}", Coin::DOGE), "DOGE");
    }

    #[test]
    fn test_coingecko_ids() {
        assert_eq!(Coin::BTC.coingecko_id(), "bitcoin");
        assert_eq!(Coin::LTC.coingecko_id(), "litecoin");
        assert_eq!(Coin::DOGE.coingecko_id(), "dogecoin");
    }
}
