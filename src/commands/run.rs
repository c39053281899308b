//! Full run: rate lookup, catalogue walk, spreadsheet append, summary mail.

use crate::catalogue::{
    CatalogWalker, CatalogueClient, CatalogueSource, RecordExtractor, StopReason,
};
use crate::config::Config;
use crate::notify::{Notifier, SmtpMailer};
use crate::rates::{ExchangeRateClient, RateProvider, RateSource};
use crate::sink::SpreadsheetSink;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// What a completed run did.
#[derive(Debug)]
pub struct RunReport {
    pub rate: Decimal,
    pub records: usize,
    pub pages_fetched: u32,
    pub stop: StopReason,
    pub rows_written: usize,
    pub notified: bool,
}

/// Executes a full scraping run.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs against the configured catalogue, rate service and mail relay.
    pub async fn execute(&self) -> Result<RunReport> {
        let rate_client =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;
        let rates = RateProvider::new(rate_client, self.config.fallback_rate);
        let source =
            CatalogueClient::new(&self.config).context("Failed to create catalogue client")?;
        let notifier = self.build_notifier();

        self.execute_with(&source, &rates, &notifier).await
    }

    /// Runs with provided collaborators (for testing).
    pub async fn execute_with<S, R>(
        &self,
        source: &S,
        rates: &RateProvider<R>,
        notifier: &Notifier,
    ) -> Result<RunReport>
    where
        S: CatalogueSource + ?Sized,
        R: RateSource,
    {
        info!("Starting the scraping process...");

        let rate = rates.rate().await;

        let walk = CatalogWalker::new(source, RecordExtractor::new(rate))
            .max_pages(self.config.max_pages)
            .policy(self.config.malformed)
            .walk()
            .await?;

        let sink = SpreadsheetSink::new(
            &self.config.output_path,
            self.config.source_currency,
            self.config.target_currency,
        );
        let rows_written = sink
            .append(&walk.records)
            .with_context(|| format!("Failed to save data to '{}'", sink.path().display()))?;

        let notified = notifier.notify(&walk.records).await;

        info!("Scraping process completed.");

        Ok(RunReport {
            rate,
            records: walk.records.len(),
            pages_fetched: walk.pages_fetched,
            stop: walk.stop,
            rows_written,
            notified,
        })
    }

    /// Like [`execute`](Self::execute), but logs any failure instead of returning it.
    pub async fn execute_guarded(&self) -> Option<RunReport> {
        guard(self.execute().await)
    }

    /// Like [`execute_with`](Self::execute_with), but logs any failure instead of returning it.
    pub async fn execute_guarded_with<S, R>(
        &self,
        source: &S,
        rates: &RateProvider<R>,
        notifier: &Notifier,
    ) -> Option<RunReport>
    where
        S: CatalogueSource + ?Sized,
        R: RateSource,
    {
        guard(self.execute_with(source, rates, notifier).await)
    }

    fn build_notifier(&self) -> Notifier {
        let source = self.config.source_currency;
        let target = self.config.target_currency;
        let mail = &self.config.mail;

        if !mail.enabled {
            info!("Email notifications disabled");
            return Notifier::disabled(source, target);
        }

        match SmtpMailer::from_config(mail) {
            Ok(mailer) => Notifier::new(mailer, mail.subject.clone(), source, target),
            Err(e) => {
                warn!("Email notifications unavailable: {}", e);
                Notifier::disabled(source, target)
            }
        }
    }
}

fn guard(result: Result<RunReport>) -> Option<RunReport> {
    match result {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Unexpected error: {:#}", e);
            None
        }
    }
}
