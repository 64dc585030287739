//! Worker display-name aliasing.
//!
//! Aliases are configured per worker, optionally scoped to a coin. Lookups
//! use a normalized form of the worker name so that names containing
//! characters that cannot appear in an environment variable key (spaces,
//! `#`, `.`, `-`) still match.

use crate::Coin;
use std::collections::HashMap;

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn normalize_worker_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Immutable alias lookup tables built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTables {
    scoped: HashMap<(Coin, String), String>,
    global: HashMap<String, String>,
}

impl AliasTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from `(key, alias)` override pairs.
    ///
    /// A key of the form `<COIN>_<name>` with a known coin creates a
    /// coin-scoped entry; any other key creates a global entry.
    pub fn from_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tables = Self::new();
        for (key, alias) in overrides {
            tables.insert_override(key.as_ref(), alias);
        }
        tables
    }

    /// Add one override, classifying it as scoped or global.
    pub fn insert_override(&mut self, key: &str, alias: impl Into<String>) {
        if let Some((prefix, name)) = key.split_once('_') {
            if let Some(coin) = Coin::parse(prefix) {
                self.insert_scoped(coin, name, alias);
                return;
            }
        }
        self.insert_global(key, alias);
    }

    /// Add a coin-scoped alias. The name is normalized before insertion.
    pub fn insert_scoped(&mut self, coin: Coin, name: &str, alias: impl Into<String>) {
        self.scoped
            .insert((coin, normalize_worker_name(name)), alias.into());
    }

    /// Add a global alias. The name is normalized before insertion.
    pub fn insert_global(&mut self, name: &str, alias: impl Into<String>) {
        self.global.insert(normalize_worker_name(name), alias.into());
    }

    /// Resolve the display name for a worker.
    ///
    /// The coin-scoped entry wins over the global one; with neither, the
    /// raw name is returned unchanged.
    pub fn resolve<'a>(&'a self, coin: Coin, raw_name: &'a str) -> &'a str {
        let key = normalize_worker_name(raw_name);
        self.scoped
            .get(&(coin, key.clone()))
            .or_else(|| self.global.get(&key))
            .map(String::as_str)
            .unwrap_or(raw_name)
    }

    pub fn scoped_len(&self) -> usize {
        self.scoped.len()
    }

    pub fn global_len(&self) -> usize {
        self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scoped.is_empty() && self.global.is_empty()
    }
}
