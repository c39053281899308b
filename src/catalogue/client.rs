//! HTTP client for catalogue listing pages.

use crate::config::Config;
use crate::error::FetchError;
use crate::http::build_client;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};
use wreq::Client;

/// Source of catalogue pages - enables fake sources in tests.
#[async_trait]
pub trait CatalogueSource: Send + Sync {
    /// Fetches the body of page `page` (1-based).
    ///
    /// `Ok(None)` means the source reported that the page does not exist.
    async fn fetch_page(&self, page: u32) -> Result<Option<String>, FetchError>;
}

/// Fetches listing pages from a templated URL such as
/// `http://books.toscrape.com/catalogue/page-{page}.html`.
pub struct CatalogueClient {
    client: Client,
    url_template: String,
    user_agent: String,
}

impl CatalogueClient {
    /// Creates a client from the catalogue settings in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            url_template: config.catalogue_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Returns the URL of page `page`.
    pub fn page_url(&self, page: u32) -> String {
        self.url_template.replace("{page}", &page.to_string())
    }
}

#[async_trait]
impl CatalogueSource for CatalogueClient {
    async fn fetch_page(&self, page: u32) -> Result<Option<String>, FetchError> {
        let url = self.page_url(page);
        info!("Scraping page {}...", page);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| FetchError::Transport { page, reason: e.to_string() })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(FetchError::Status { page, status: status.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport { page, reason: e.to_string() })?;

        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config(server: &MockServer) -> Config {
        Config {
            catalogue_url: format!("{}/catalogue/page-{{page}}.html", server.uri()),
            ..Config::default()
        }
    }

    #[test]
    fn test_page_url_template() {
        let client = CatalogueClient::new(&Config::default()).unwrap();
        assert_eq!(client.page_url(3), "http://books.toscrape.com/catalogue/page-3.html");
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/page-2.html"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>listing page 2</html>"),
            )
            .mount(&mock_server)
            .await;

        let client = CatalogueClient::new(&make_test_config(&mock_server)).unwrap();
        let body = client.fetch_page(2).await.unwrap();
        assert_eq!(body.as_deref(), Some("<html>listing page 2</html>"));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/page-1.html"))
            .and(header("User-Agent", "bookwatch-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let mut config = make_test_config(&mock_server);
        config.user_agent = "bookwatch-test".to_string();

        let client = CatalogueClient::new(&config).unwrap();
        assert_eq!(client.fetch_page(1).await.unwrap().as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_fetch_page_404_is_end_of_catalogue() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/page-51.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = CatalogueClient::new(&make_test_config(&mock_server)).unwrap();
        assert!(client.fetch_page(51).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/page-1.html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = CatalogueClient::new(&make_test_config(&mock_server)).unwrap();
        let err = client.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { page: 1, status: 500 }));
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        let mock_server = MockServer::start().await;
        let config = make_test_config(&mock_server);
        drop(mock_server);

        let client = CatalogueClient::new(&config).unwrap();
        let err = client.fetch_page(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { page: 1, .. }));
    }
}
