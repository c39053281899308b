//! Shared HTTP client construction.

use crate::config::Config;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;
use wreq::Client;

/// Builds the client used for catalogue pages and rate lookups.
pub fn build_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder()
        .gzip(true)
        .brotli(true)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10));

    if let Some(proxy_url) = &config.proxy {
        debug!("Configuring proxy: {}", proxy_url);
        let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
        builder = builder.proxy(proxy);
    }

    builder.build().context("Failed to build HTTP client")
}
