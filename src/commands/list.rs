//! List command: walk the catalogue and print records without saving or mailing.

use crate::catalogue::{CatalogWalker, CatalogueClient, CatalogueSource, RecordExtractor};
use crate::config::Config;
use crate::format::Formatter;
use crate::rates::{ExchangeRateClient, RateProvider, RateSource};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Prints the current catalogue in the configured output format.
pub struct ListCommand {
    config: Config,
}

impl ListCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Walks the configured catalogue and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let rate_client =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;
        let rates = RateProvider::new(rate_client, self.config.fallback_rate);
        let source =
            CatalogueClient::new(&self.config).context("Failed to create catalogue client")?;

        self.execute_with(&source, &rates).await
    }

    /// Walks with provided collaborators (for testing).
    pub async fn execute_with<S, R>(&self, source: &S, rates: &RateProvider<R>) -> Result<String>
    where
        S: CatalogueSource + ?Sized,
        R: RateSource,
    {
        let rate = rates.rate().await;

        let walk = CatalogWalker::new(source, RecordExtractor::new(rate))
            .max_pages(self.config.max_pages)
            .policy(self.config.malformed)
            .walk()
            .await?;

        debug!("Walk stopped: {}", walk.stop);
        info!("Found {} books on {} pages", walk.records.len(), walk.pages_fetched);

        let formatter = Formatter::new(
            self.config.format,
            self.config.source_currency,
            self.config.target_currency,
        );
        Ok(formatter.format_records(&walk.records))
    }
}

/// Rate command: report the conversion rate that a run would use.
pub struct RateCommand {
    config: Config,
}

impl RateCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<String> {
        let rate_client =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;
        let rates = RateProvider::new(rate_client, self.config.fallback_rate);
        Ok(self.execute_with(&rates).await)
    }

    pub async fn execute_with<R: RateSource>(&self, rates: &RateProvider<R>) -> String {
        let rate = rates.rate().await;
        format!(
            "1 {} = {} {}",
            self.config.source_currency, rate, self.config.target_currency
        )
    }
}
