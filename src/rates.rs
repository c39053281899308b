//! Currency conversion rate lookup with a fixed fallback.

use crate::catalogue::Currency;
use crate::config::Config;
use crate::error::RateError;
use crate::http::build_client;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use wreq::Client;

/// Source of a live conversion rate - enables failing sources in tests.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self) -> Result<Decimal, RateError>;
}

/// Payload of the `/v4/latest/{base}` endpoint; only the rate table is read.
#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

/// Looks up `source → target` on an exchangerate-api style endpoint.
pub struct ExchangeRateClient {
    client: Client,
    url: String,
    target: Currency,
}

impl ExchangeRateClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.rate_endpoint(),
            target: config.target_currency,
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rate(&self) -> Result<Decimal, RateError> {
        info!("Fetching conversion rate...");
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| RateError::Transport(e.to_string()))?;
        parse_rate(&body, self.target)
    }
}

/// Reads the positive rate for `target` from a rates payload.
fn parse_rate(body: &str, target: Currency) -> Result<Decimal, RateError> {
    let payload: LatestRates = serde_json::from_str(body)?;

    let value = payload
        .rates
        .get(target.code())
        .copied()
        .ok_or_else(|| RateError::MissingRate(target.code().to_string()))?;

    match Decimal::from_f64(value) {
        Some(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(RateError::NonPositive(value.to_string())),
    }
}

/// Supplies the rate for a run, substituting a fallback when the lookup fails.
pub struct RateProvider<S: RateSource> {
    source: S,
    fallback: Decimal,
}

impl<S: RateSource> RateProvider<S> {
    pub fn new(source: S, fallback: Decimal) -> Self {
        Self { source, fallback }
    }

    /// Returns the live rate, or the fallback if it cannot be fetched.
    pub async fn rate(&self) -> Decimal {
        match self.source.fetch_rate().await {
            Ok(rate) => {
                info!("Conversion rate fetched: {}", rate);
                rate
            }
            Err(e) => {
                warn!("Error fetching conversion rate: {}. Using fallback {}", e, self.fallback);
                self.fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedSource(Result<Decimal, ()>);

    #[async_trait]
    impl RateSource for FixedSource {
        async fn fetch_rate(&self) -> Result<Decimal, RateError> {
            self.0.map_err(|_| RateError::Transport("connection refused".to_string()))
        }
    }

    fn make_test_config(server: &MockServer) -> Config {
        Config { rate_url: format!("{}/v4/latest/{{base}}", server.uri()), ..Config::default() }
    }

    #[tokio::test]
    async fn test_provider_returns_live_rate() {
        let provider = RateProvider::new(FixedSource(Ok(Decimal::new(8952, 2))), Decimal::from(90));
        assert_eq!(provider.rate().await, Decimal::new(8952, 2));
    }

    #[tokio::test]
    async fn test_provider_falls_back_on_error() {
        let provider = RateProvider::new(FixedSource(Err(())), Decimal::from(90));
        assert_eq!(provider.rate().await, Decimal::from(90));
    }

    #[test]
    fn test_parse_rate() {
        let body = r#"{"base":"EUR","rates":{"EUR":1,"INR":89.5,"USD":1.08}}"#;
        assert_eq!(parse_rate(body, Currency::Inr).unwrap(), Decimal::new(895, 1));
        assert_eq!(parse_rate(body, Currency::Usd).unwrap(), Decimal::new(108, 2));
    }

    #[test]
    fn test_parse_rate_missing_currency() {
        let body = r#"{"rates":{"USD":1.08}}"#;
        let err = parse_rate(body, Currency::Inr).unwrap_err();
        assert!(matches!(err, RateError::MissingRate(code) if code == "INR"));
    }

    #[test]
    fn test_parse_rate_bad_shape() {
        assert!(matches!(parse_rate("not json", Currency::Inr), Err(RateError::Json(_))));
        assert!(matches!(parse_rate(r#"{"result":"error"}"#, Currency::Inr), Err(RateError::Json(_))));
    }

    #[test]
    fn test_parse_rate_non_positive() {
        let body = r#"{"rates":{"INR":0}}"#;
        assert!(matches!(parse_rate(body, Currency::Inr), Err(RateError::NonPositive(_))));

        let body = r#"{"rates":{"INR":-3.2}}"#;
        assert!(matches!(parse_rate(body, Currency::Inr), Err(RateError::NonPositive(_))));
    }

    #[tokio::test]
    async fn test_client_fetches_rate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base":"EUR","rates":{"INR":91.25}}"#),
            )
            .mount(&mock_server)
            .await;

        let client = ExchangeRateClient::new(&make_test_config(&mock_server)).unwrap();
        assert_eq!(client.fetch_rate().await.unwrap(), Decimal::new(9125, 2));
    }

    #[tokio::test]
    async fn test_client_http_error_falls_back() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = ExchangeRateClient::new(&make_test_config(&mock_server)).unwrap();
        assert!(matches!(client.fetch_rate().await, Err(RateError::Status(500))));

        let provider = RateProvider::new(client, Decimal::from(90));
        assert_eq!(provider.rate().await, Decimal::from(90));
    }

    #[tokio::test]
    async fn test_client_malformed_payload_falls_back() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let client = ExchangeRateClient::new(&make_test_config(&mock_server)).unwrap();
        let provider = RateProvider::new(client, Decimal::new(925, 1));
        assert_eq!(provider.rate().await, Decimal::new(925, 1));
    }
}
