// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::{DEFAULT_RATE_URL, DEFAULT_TRM};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub api_url: String,
    /// Session token for the persistence API; `None` keeps data on-device.
    pub api_token: Option<String>,
    pub rate_url: String,
    pub fallback_trm: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            api_url: "http://localhost:5000".into(),
            api_token: None,
            rate_url: DEFAULT_RATE_URL.into(),
            fallback_trm: DEFAULT_TRM,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let fallback_trm = match non_empty("BILLETERA_FALLBACK_TRM") {
            Some(raw) => match raw.parse::<Decimal>() {
                Ok(r) if r > Decimal::ZERO => r,
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid BILLETERA_FALLBACK_TRM");
                    defaults.fallback_trm
                }
            },
            None => defaults.fallback_trm,
        };

        Self {
            db_path: non_empty("BILLETERA_DB_PATH").map(PathBuf::from),
            api_url: non_empty("BILLETERA_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_token: non_empty("BILLETERA_API_TOKEN"),
            rate_url: non_empty("BILLETERA_RATE_URL").unwrap_or(defaults.rate_url),
            fallback_trm,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_are_local_mode() {
        let c = Config::from_lookup(lookup(&[]));
        assert!(!c.is_authenticated());
        assert_eq!(c.fallback_trm, DEFAULT_TRM);
        assert_eq!(c.rate_url, DEFAULT_RATE_URL);
    }

    #[test]
    fn token_and_overrides() {
        let c = Config::from_lookup(lookup(&[
            ("BILLETERA_API_TOKEN", "abc"),
            ("BILLETERA_API_URL", "https://finanzas.example/"),
            ("BILLETERA_FALLBACK_TRM", "3950.5"),
        ]));
        assert!(c.is_authenticated());
        assert_eq!(c.api_url, "https://finanzas.example");
        assert_eq!(c.fallback_trm, Decimal::new(39505, 1));
    }

    #[test]
    fn bad_trm_keeps_default() {
        let c = Config::from_lookup(lookup(&[("BILLETERA_FALLBACK_TRM", "-1")]));
        assert_eq!(c.fallback_trm, DEFAULT_TRM);
        let c = Config::from_lookup(lookup(&[("BILLETERA_API_TOKEN", "  ")]));
        assert!(!c.is_authenticated());
    }
}
