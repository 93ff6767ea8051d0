//! Exchange-rate source client.
//!
//! Pulls current TRY unit prices for currencies and gold from a configurable
//! JSON endpoint. Uses `reqwest` with rustls.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::RatesConfig;

/// Exchange-rate client errors.
#[derive(Debug, Error)]
pub enum RateError {
    /// Failed to reach the rate source.
    #[error("Failed to fetch rates: {0}")]
    Fetch(String),
    /// Response was not the expected JSON shape.
    #[error("Invalid rate payload: {0}")]
    InvalidPayload(String),
}

/// Client for the exchange-rate source.
///
/// The endpoint is expected to return a flat JSON object mapping instrument
/// codes to decimal strings, e.g. `{"USD": "41.95", "gram-altin": "5123.40"}`.
#[derive(Clone)]
pub struct RateService {
    config: RatesConfig,
    client: reqwest::Client,
}

impl RateService {
    /// Creates a new rate service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: RatesConfig) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RateError::Fetch(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Fetches the latest TRY unit prices keyed by instrument code.
    ///
    /// Codes are returned uppercased so lookups are case-insensitive for
    /// callers. Entries that do not parse as decimals are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a JSON
    /// object of strings.
    pub async fn fetch_latest(&self) -> Result<HashMap<String, Decimal>, RateError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| RateError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| RateError::Fetch(e.to_string()))?;

        let raw: HashMap<String, String> = response
            .json()
            .await
            .map_err(|e| RateError::InvalidPayload(e.to_string()))?;

        Ok(parse_rates(&raw))
    }
}

/// Parses raw `code -> decimal string` pairs, dropping malformed entries.
#[must_use]
pub fn parse_rates(raw: &HashMap<String, String>) -> HashMap<String, Decimal> {
    raw.iter()
        .filter_map(|(code, price)| {
            Decimal::from_str(price.trim())
                .ok()
                .map(|rate| (code.trim().to_uppercase(), rate))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rates_uppercases_codes() {
        let mut raw = HashMap::new();
        raw.insert("usd".to_string(), "41.95".to_string());
        raw.insert("gram-altin".to_string(), "5123.40".to_string());

        let rates = parse_rates(&raw);

        assert_eq!(rates.get("USD"), Some(&dec!(41.95)));
        assert_eq!(rates.get("GRAM-ALTIN"), Some(&dec!(5123.40)));
    }

    #[test]
    fn test_parse_rates_skips_malformed_entries() {
        let mut raw = HashMap::new();
        raw.insert("USD".to_string(), "41.95".to_string());
        raw.insert("EUR".to_string(), "not-a-number".to_string());

        let rates = parse_rates(&raw);

        assert_eq!(rates.len(), 1);
        assert!(rates.contains_key("USD"));
    }

    #[test]
    fn test_parse_rates_trims_whitespace() {
        let mut raw = HashMap::new();
        raw.insert(" usd ".to_string(), " 41.95 ".to_string());

        let rates = parse_rates(&raw);

        assert_eq!(rates.get("USD"), Some(&dec!(41.95)));
    }
}
