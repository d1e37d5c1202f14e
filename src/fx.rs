// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::utils::http_client;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

pub const DEFAULT_RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Baseline TRM used until a refresh succeeds.
pub const DEFAULT_TRM: Decimal = Decimal::from_parts(4100, 0, 0, false, 0);

/// Something that can report today's COP-per-USD rate.
pub trait RateSource: Send + Sync {
    fn fetch_rate(&self) -> Result<Decimal>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, Decimal>,
}

pub struct HttpRateSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: http_client()?,
        })
    }
}

impl RateSource for HttpRateSource {
    fn fetch_rate(&self) -> Result<Decimal> {
        let resp = self.client.get(&self.url).send()?.error_for_status()?;
        let body: LatestRates = resp.json()?;
        parse_cop_rate(&body)
    }
}

fn parse_cop_rate(body: &LatestRates) -> Result<Decimal> {
    match body.rates.get("COP") {
        Some(r) if *r > Decimal::ZERO => Ok(*r),
        Some(r) => Err(Error::RateUnavailable(format!("non-positive COP rate {}", r))),
        None => Err(Error::RateUnavailable("response has no COP rate".into())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Cached,
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuote {
    pub rate: Decimal,
    pub origin: RateOrigin,
}

impl RateQuote {
    pub fn is_fallback(&self) -> bool {
        self.origin == RateOrigin::Fallback
    }
}

/// Rate lookups with a per-day cache and one fetch at a time.
///
/// Every date resolves to the rate current at lookup time; the cache only
/// keeps repeated lookups for the same day from hitting the network.
pub struct RateProvider {
    source: Box<dyn RateSource>,
    cache: Mutex<HashMap<String, Decimal>>,
    fetch_lock: Mutex<()>,
    base_rate: RwLock<Decimal>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RateProvider {
    pub fn new(source: Box<dyn RateSource>, base_rate: Decimal) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
            fetch_lock: Mutex::new(()),
            base_rate: RwLock::new(base_rate),
        }
    }

    pub fn with_cache(self, entries: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        lock(&self.cache).extend(entries);
        self
    }

    pub fn base_rate(&self) -> Decimal {
        *self.base_rate.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cache_entries(&self) -> BTreeMap<String, Decimal> {
        lock(&self.cache)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Fetches the live rate. Failures are logged and reported as `None`.
    pub fn fetch_current_rate(&self) -> Option<Decimal> {
        match self.source.fetch_rate() {
            Ok(rate) => Some(rate),
            Err(e) => {
                tracing::warn!(error = %e, "exchange rate fetch failed");
                None
            }
        }
    }

    pub fn get_rate_for_date(&self, date: NaiveDate) -> RateQuote {
        let key = date.format("%Y-%m-%d").to_string();
        if let Some(rate) = self.cached(&key) {
            tracing::debug!(%key, %rate, "rate cache hit");
            return RateQuote {
                rate,
                origin: RateOrigin::Cached,
            };
        }

        let _guard = lock(&self.fetch_lock);
        // another caller may have filled it while we waited
        if let Some(rate) = self.cached(&key) {
            return RateQuote {
                rate,
                origin: RateOrigin::Cached,
            };
        }

        match self.fetch_current_rate() {
            Some(rate) => {
                lock(&self.cache).insert(key, rate);
                RateQuote {
                    rate,
                    origin: RateOrigin::Live,
                }
            }
            None => {
                let rate = self.base_rate();
                tracing::warn!(%key, %rate, "using fallback TRM");
                RateQuote {
                    rate,
                    origin: RateOrigin::Fallback,
                }
            }
        }
    }

    /// Clears the cache and, if the fetch succeeds, moves the baseline.
    pub fn refresh(&self) -> Option<Decimal> {
        let _guard = lock(&self.fetch_lock);
        lock(&self.cache).clear();
        let rate = self.fetch_current_rate()?;
        *self.base_rate.write().unwrap_or_else(PoisonError::into_inner) = rate;
        tracing::info!(%rate, "baseline TRM refreshed");
        Some(rate)
    }

    fn cached(&self, key: &str) -> Option<Decimal> {
        lock(&self.cache).get(key).copied()
    }
}
