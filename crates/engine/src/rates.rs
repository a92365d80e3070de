//! Exchange rate derivation and the rate provider client.
//!
//! The provider quotes every currency against [`PIVOT_CURRENCY`]. Cross rates
//! are derived by dividing two pivot quotes, so one HTTP call is enough to
//! rebuild the whole pairwise table.

use std::{collections::HashMap, future::Future, time::Duration};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{EngineError, ExchangeRate, ResultEngine, currency::PIVOT_CURRENCY};

/// Pivot-relative quotes as returned by a provider (`code -> units per USD`).
pub type BaseRates = HashMap<String, f64>;

/// Source of pivot-relative quotes.
pub trait RateProvider: Send + Sync {
    fn fetch_base_rates(&self) -> impl Future<Output = ResultEngine<BaseRates>> + Send;
}

/// Result of [`derive_pairwise_rates`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedRates {
    pub rates: Vec<ExchangeRate>,
    /// Supported currencies with no usable quote. Pairs involving them are
    /// left out of `rates`.
    pub missing: Vec<String>,
}

fn usable_quote(base_rates: &BaseRates, code: &str) -> Option<f64> {
    match base_rates.get(code) {
        Some(rate) if rate.is_finite() && *rate > 0.0 => Some(*rate),
        Some(_) => None,
        None if code == PIVOT_CURRENCY => Some(1.0),
        None => None,
    }
}

/// Builds the rate for every ordered pair of distinct supported currencies.
///
/// `rate(from, to) = base[to] / base[from]`, except when `from` is the pivot,
/// where the provider quote is used as is.
pub fn derive_pairwise_rates(
    base_rates: &BaseRates,
    supported: &[String],
    fetched_at: DateTime<Utc>,
) -> DerivedRates {
    let mut missing: Vec<String> = supported
        .iter()
        .filter(|code| usable_quote(base_rates, code).is_none())
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();

    let mut rates = Vec::new();
    for from in supported {
        let Some(from_quote) = usable_quote(base_rates, from) else {
            continue;
        };
        for to in supported {
            if to == from {
                continue;
            }
            let Some(to_quote) = usable_quote(base_rates, to) else {
                continue;
            };

            let rate = if from == PIVOT_CURRENCY {
                to_quote
            } else {
                to_quote / from_quote
            };
            rates.push(ExchangeRate {
                from_currency: from.clone(),
                to_currency: to.clone(),
                rate,
                fetched_at,
            });
        }
    }

    DerivedRates { rates, missing }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, serde_json::Value>,
}

/// Client for the Open Exchange Rates `latest.json` endpoint.
#[derive(Clone, Debug)]
pub struct OpenExchangeRates {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
}

impl OpenExchangeRates {
    pub const DEFAULT_BASE_URL: &'static str = "https://openexchangerates.org/api";

    /// Return a builder for `OpenExchangeRates`.
    pub fn builder() -> OpenExchangeRatesBuilder {
        OpenExchangeRatesBuilder::default()
    }

    fn url(&self) -> String {
        format!("{}/latest.json", self.base_url.trim_end_matches('/'))
    }
}

impl RateProvider for OpenExchangeRates {
    async fn fetch_base_rates(&self) -> ResultEngine<BaseRates> {
        // The request URL carries the API key.
        let upstream =
            |err: reqwest::Error| EngineError::UpstreamUnavailable(err.without_url().to_string());

        let response = self
            .client
            .get(self.url())
            .query(&[("app_id", self.app_id.as_str())])
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?;
        let body: LatestResponse = response.json().await.map_err(upstream)?;

        let rates: BaseRates = body
            .rates
            .into_iter()
            .filter_map(|(code, value)| value.as_f64().map(|rate| (code, rate)))
            .collect();
        if rates.is_empty() {
            return Err(EngineError::UpstreamUnavailable(
                "provider returned no rates".to_string(),
            ));
        }
        tracing::debug!("fetched {} base rates", rates.len());
        Ok(rates)
    }
}

/// The builder for `OpenExchangeRates`
pub struct OpenExchangeRatesBuilder {
    base_url: String,
    app_id: String,
    timeout: Duration,
}

impl Default for OpenExchangeRatesBuilder {
    fn default() -> Self {
        Self {
            base_url: OpenExchangeRates::DEFAULT_BASE_URL.to_string(),
            app_id: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl OpenExchangeRatesBuilder {
    /// API key sent as the `app_id` query parameter.
    pub fn app_id(mut self, app_id: &str) -> Self {
        self.app_id = app_id.to_string();
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Upper bound for the whole request, connect included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Construct `OpenExchangeRates`
    pub fn build(self) -> ResultEngine<OpenExchangeRates> {
        if self.app_id.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "exchange rate app_id must not be empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| EngineError::UpstreamUnavailable(err.to_string()))?;
        Ok(OpenExchangeRates {
            client,
            base_url: self.base_url,
            app_id: self.app_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn base() -> BaseRates {
        HashMap::from([
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.9),
            ("GBP".to_string(), 0.8),
        ])
    }

    fn rate(derived: &DerivedRates, from: &str, to: &str) -> f64 {
        derived
            .rates
            .iter()
            .find(|r| r.from_currency == from && r.to_currency == to)
            .map(|r| r.rate)
            .unwrap()
    }

    #[test]
    fn cross_rates_divide_pivot_quotes() {
        let derived = derive_pairwise_rates(&base(), &codes(&["USD", "EUR", "GBP"]), Utc::now());

        assert_eq!(derived.rates.len(), 6);
        assert!(derived.missing.is_empty());
        assert_eq!(rate(&derived, "EUR", "GBP"), 0.8 / 0.9);
        assert_eq!(rate(&derived, "GBP", "EUR"), 0.9 / 0.8);
        assert_eq!(rate(&derived, "EUR", "USD"), 1.0 / 0.9);
    }

    #[test]
    fn pivot_rows_use_provider_quote() {
        let derived = derive_pairwise_rates(&base(), &codes(&["USD", "GBP"]), Utc::now());
        assert_eq!(rate(&derived, "USD", "GBP"), 0.8);
    }

    #[test]
    fn missing_currencies_are_skipped_and_reported() {
        let mut rates = base();
        rates.insert("JPY".to_string(), 0.0);
        let supported = codes(&["USD", "EUR", "GBP", "JPY", "CHF"]);
        let derived = derive_pairwise_rates(&rates, &supported, Utc::now());

        assert_eq!(derived.missing, codes(&["CHF", "JPY"]));
        assert_eq!(derived.rates.len(), 6);
        assert!(
            derived
                .rates
                .iter()
                .all(|r| r.rate.is_finite() && r.rate > 0.0)
        );
    }

    #[test]
    fn pivot_defaults_to_one_when_omitted() {
        let rates = HashMap::from([("EUR".to_string(), 0.5)]);
        let derived = derive_pairwise_rates(&rates, &codes(&["USD", "EUR"]), Utc::now());

        assert!(derived.missing.is_empty());
        assert_eq!(rate(&derived, "EUR", "USD"), 2.0);
        assert_eq!(rate(&derived, "USD", "EUR"), 0.5);
    }

    #[test]
    fn builder_requires_app_id() {
        assert!(OpenExchangeRates::builder().build().is_err());
        let client = OpenExchangeRates::builder()
            .app_id("key")
            .base_url("http://localhost:9/api/")
            .build()
            .unwrap();
        assert_eq!(client.url(), "http://localhost:9/api/latest.json");
    }
}
