//! Rate table types and the provider abstraction.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// An ISO 4217 style currency code: exactly three ASCII letters, stored
/// uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
        } else {
            Err(anyhow::anyhow!(
                "Invalid currency code: {s:?} (expected three letters, e.g. USD)"
            ))
        }
    }
}

/// Snapshot of conversion factors for one unit of the base currency.
///
/// Valid only until the base currency changes; the session drops it before
/// requesting a table for a new base.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: CurrencyCode,
    fetched_at: Option<DateTime<Utc>>,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    /// Builds a table from raw provider entries. Codes that do not parse and
    /// factors that are not positive finite numbers are dropped here, so the
    /// rest of the program never sees them.
    pub fn from_raw(
        base: CurrencyCode,
        fetched_at: Option<DateTime<Utc>>,
        raw: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        let mut rates = BTreeMap::new();
        let mut dropped = 0usize;
        for (code, factor) in raw {
            match code.parse::<CurrencyCode>() {
                Ok(code) if factor.is_finite() && factor > 0.0 => {
                    rates.insert(code, factor);
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(%base, dropped, "Dropped unusable entries from rate table");
        }
        RateTable {
            base,
            fetched_at,
            rates,
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Provider-reported time the rates were last updated, when available.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn rate_for(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Currency codes in the table, in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Failure modes of a rate fetch. Each variant renders a distinct
/// user-visible message.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("API key not configured")]
    MissingCredential,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {status} {reason}")]
    Http { status: u16, reason: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Failed to decode rates response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full conversion-rate table for one unit of `base`.
    ///
    /// Issues at most one outbound request; never retries.
    async fn latest(&self, base: &CurrencyCode) -> Result<RateTable, RateError>;
}
