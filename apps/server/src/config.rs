//! Application configuration, loaded once from the environment.

use chrono::FixedOffset;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;
use trustpool_alerts::NotifierConfig;
use trustpool_core::{AliasTables, Coin};
use trustpool_engine::ReportConfig;
use trustpool_feeds::{PoolClientConfig, DEFAULT_BASE_URL};

const ALIAS_PREFIX: &str = "WORKER_ALIAS_";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Application settings.
#[derive(Clone)]
pub struct Settings {
    /// Telegram bot token.
    pub telegram_token: String,
    /// Chats receiving alert broadcasts.
    pub chat_ids: Vec<i64>,
    /// Pool API base URL without a trailing slash.
    pub pool_base: String,
    /// Pool access key.
    pub access_key: String,
    /// Coins to report and watch, in order.
    pub coins: Vec<Coin>,
    /// Fiat currency code, uppercase.
    pub fiat: String,
    pub offline_threshold_min: i64,
    /// `ONLY_OFFLINE_ALERTS`: when set, payout alerts are off.
    pub only_offline_alerts: bool,
    /// Offset of the local day used by reports.
    pub utc_offset: FixedOffset,
    pub tz_label: String,
    /// Worker display-name overrides.
    pub aliases: AliasTables,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("telegram_token", &"<redacted>")
            .field("chat_ids", &self.chat_ids)
            .field("pool_base", &self.pool_base)
            .field("access_key", &"<redacted>")
            .field("coins", &self.coins)
            .field("fiat", &self.fiat)
            .field("offline_threshold_min", &self.offline_threshold_min)
            .field("only_offline_alerts", &self.only_offline_alerts)
            .field("utc_offset", &self.utc_offset)
            .field("tz_label", &self.tz_label)
            .field("aliases", &(self.aliases.scoped_len() + self.aliases.global_len()))
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Build settings from `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let telegram_token = get("TELEGRAM_TOKEN")
            .ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?
            .to_string();

        let chat_ids = get("TELEGRAM_CHAT_IDS")
            .map(parse_chat_ids)
            .unwrap_or_default();

        let pool_base = get("TRUSTPOOL_BASE")
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        if url::Url::parse(&pool_base).is_err() {
            return Err(ConfigError::Invalid {
                key: "TRUSTPOOL_BASE",
                value: pool_base,
            });
        }

        let access_key = get("TRUSTPOOL_ACCESS_KEY").unwrap_or_default().to_string();

        let mut coins = get("COINS").map(parse_coins).unwrap_or_default();
        if coins.is_empty() {
            coins.push(Coin::BTC);
        }

        let fiat = get("FIAT").unwrap_or("USD").to_uppercase();

        let offline_threshold_min: i64 = parse_number(&vars, "ALERT_OFFLINE_MINUTES", 10)?;
        let only_offline_alerts = get("ONLY_OFFLINE_ALERTS")
            .map(parse_flag)
            .unwrap_or(false);

        let offset_hours: i32 = parse_number(&vars, "REPORT_UTC_OFFSET_HOURS", 3)?;
        let utc_offset =
            FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| ConfigError::Invalid {
                key: "REPORT_UTC_OFFSET_HOURS",
                value: offset_hours.to_string(),
            })?;
        let tz_label = get("REPORT_TZ_LABEL").unwrap_or("MSK").to_string();

        let aliases = AliasTables::from_overrides(vars.iter().filter_map(|(key, value)| {
            let tail = key.strip_prefix(ALIAS_PREFIX)?;
            (!tail.is_empty()).then(|| (tail.to_string(), value.clone()))
        }));

        Ok(Self {
            telegram_token,
            chat_ids,
            pool_base,
            access_key,
            coins,
            fiat,
            offline_threshold_min,
            only_offline_alerts,
            utc_offset,
            tz_label,
            aliases,
        })
    }
}

/// Comma-separated chat ids. Invalid entries are skipped.
fn parse_chat_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(value = s, "Skipping invalid chat id");
                None
            }
        })
        .collect()
}

/// Comma-separated coin symbols. Unknown symbols are skipped.
fn parse_coins(raw: &str) -> Vec<Coin> {
    let mut coins = Vec::new();
    for symbol in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match Coin::parse(symbol) {
            Some(coin) if !coins.contains(&coin) => coins.push(coin),
            Some(_) => {}
            None => warn!(symbol = symbol, "Skipping unknown coin"),
        }
    }
    coins
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Numeric setting `key`, `default` when unset or blank.
fn parse_number<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

impl From<&Settings> for ReportConfig {
    fn from(settings: &Settings) -> Self {
        ReportConfig {
            coins: settings.coins.clone(),
            fiat: settings.fiat.clone(),
            utc_offset: settings.utc_offset,
            tz_label: settings.tz_label.clone(),
            ..Default::default()
        }
    }
}

impl From<&Settings> for NotifierConfig {
    fn from(settings: &Settings) -> Self {
        NotifierConfig {
            coins: settings.coins.clone(),
            offline_threshold_min: settings.offline_threshold_min,
            only_offline_alerts: settings.only_offline_alerts,
            chat_ids: settings.chat_ids.clone(),
        }
    }
}

impl From<&Settings> for PoolClientConfig {
    fn from(settings: &Settings) -> Self {
        PoolClientConfig {
            base_url: settings.pool_base.clone(),
            access_key: settings.access_key.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(vars(&[("TELEGRAM_TOKEN", "123:abc")])).unwrap();

        assert_eq!(settings.telegram_token, "123:abc");
        assert!(settings.chat_ids.is_empty());
        assert_eq!(settings.pool_base, DEFAULT_BASE_URL);
        assert_eq!(settings.access_key, "");
        assert_eq!(settings.coins, vec![Coin::BTC]);
        assert_eq!(settings.fiat, "USD");
        assert_eq!(settings.offline_threshold_min, 10);
        assert!(!settings.only_offline_alerts);
        assert_eq!(settings.utc_offset.local_minus_utc(), 3 * 3600);
        assert_eq!(settings.tz_label, "MSK");
        assert!(settings.aliases.is_empty());
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            Settings::from_vars(vars(&[("COINS", "BTC")])).unwrap_err(),
            ConfigError::Missing("TELEGRAM_TOKEN")
        );
        assert_eq!(
            Settings::from_vars(vars(&[("TELEGRAM_TOKEN", "  ")])).unwrap_err(),
            ConfigError::Missing("TELEGRAM_TOKEN")
        );
    }

    #[test]
    fn test_full_environment() {
        let settings = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_IDS", "111, -1001234567890,abc,,222"),
            ("TRUSTPOOL_BASE", "https://pool.example/api/"),
            ("TRUSTPOOL_ACCESS_KEY", "secret"),
            ("COINS", "ltc, xmr, BTC, LTC"),
            ("FIAT", "rub"),
            ("ALERT_OFFLINE_MINUTES", "30"),
            ("ONLY_OFFLINE_ALERTS", "Yes"),
            ("REPORT_UTC_OFFSET_HOURS", "0"),
            ("REPORT_TZ_LABEL", "UTC"),
        ]))
        .unwrap();

        assert_eq!(settings.chat_ids, vec![111, -1001234567890, 222]);
        assert_eq!(settings.pool_base, "https://pool.example/api");
        assert_eq!(settings.access_key, "secret");
        assert_eq!(settings.coins, vec![Coin::LTC, Coin::BTC]);
        assert_eq!(settings.fiat, "RUB");
        assert_eq!(settings.offline_threshold_min, 30);
        assert!(settings.only_offline_alerts);
        assert_eq!(settings.utc_offset.local_minus_utc(), 0);
        assert_eq!(settings.tz_label, "UTC");
    }

    #[test]
    fn test_unknown_coins_fall_back_to_btc() {
        let settings =
            Settings::from_vars(vars(&[("TELEGRAM_TOKEN", "t"), ("COINS", "XMR,ETH")])).unwrap();
        assert_eq!(settings.coins, vec![Coin::BTC]);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("ALERT_OFFLINE_MINUTES", "ten"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "ALERT_OFFLINE_MINUTES",
                value: "ten".to_string()
            }
        );
        let result = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("REPORT_UTC_OFFSET_HOURS", "30"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "REPORT_UTC_OFFSET_HOURS", .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TRUSTPOOL_BASE", "not a url"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "TRUSTPOOL_BASE", .. })
        ));
    }

    #[test]
    fn test_flag_values() {
        let cases = [
            ("1", true),
            ("TRUE", true),
            ("yes", true),
            ("0", false),
            ("no", false),
        ];
        for (raw, expected) in cases {
            let settings = Settings::from_vars(vars(&[
                ("TELEGRAM_TOKEN", "t"),
                ("ONLY_OFFLINE_ALERTS", raw),
            ]))
            .unwrap();
            assert_eq!(settings.only_offline_alerts, expected, "flag {:?}", raw);
        }
    }

    #[test]
    fn test_worker_aliases() {
        let settings = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("WORKER_ALIAS_BTC_rig_01", "Office Rig"),
            ("WORKER_ALIAS_garage", "Garage"),
            ("WORKER_ALIAS_", "ignored"),
        ]))
        .unwrap();

        assert_eq!(settings.aliases.scoped_len(), 1);
        assert_eq!(settings.aliases.global_len(), 1);
        assert_eq!(settings.aliases.resolve(Coin::BTC, "rig.01"), "Office Rig");
        assert_eq!(settings.aliases.resolve(Coin::LTC, "rig.01"), "rig.01");
        assert_eq!(settings.aliases.resolve(Coin::LTC, "garage"), "Garage");
    }

    #[test]
    fn test_component_configs() {
        let settings = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_IDS", "42"),
            ("COINS", "BTC,DOGE"),
            ("TRUSTPOOL_ACCESS_KEY", "key"),
        ]))
        .unwrap();

        let report = ReportConfig::from(&settings);
        assert_eq!(report.coins, vec![Coin::BTC, Coin::DOGE]);
        assert_eq!(report.chart_size, 240);

        let notifier = NotifierConfig::from(&settings);
        assert_eq!(notifier.chat_ids, vec![42]);
        assert_eq!(notifier.offline_threshold_min, 10);

        let pool = PoolClientConfig::from(&settings);
        assert_eq!(pool.access_key, "key");
        assert_eq!(pool.timeout.as_secs(), 20);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = Settings::from_vars(vars(&[
            ("TELEGRAM_TOKEN", "123:secret-token"),
            ("TRUSTPOOL_ACCESS_KEY", "access-secret"),
        ]))
        .unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("access-secret"));
    }
}
