//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::catalogue::walker::{MalformedPolicy, DEFAULT_MAX_PAGES};
use crate::catalogue::Currency;
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing page URL; `{page}` is replaced with the page number
    #[serde(default = "default_catalogue_url")]
    pub catalogue_url: String,

    /// User-Agent header sent with every page request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Safety limit on pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// What to do with a listing whose fields cannot be parsed
    #[serde(default)]
    pub malformed: MalformedPolicy,

    /// Exchange rate endpoint; `{base}` is replaced with the source currency code
    #[serde(default = "default_rate_url")]
    pub rate_url: String,

    /// Currency the catalogue prices are read as
    #[serde(default = "default_source_currency")]
    pub source_currency: Currency,

    /// Currency prices are converted to
    #[serde(default = "default_target_currency")]
    pub target_currency: Currency,

    /// Rate used when the live lookup fails
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: Decimal,

    /// Spreadsheet file records are appended to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Output format for `list`
    #[serde(default)]
    pub format: OutputFormat,

    /// Summary mail settings
    #[serde(default)]
    pub mail: MailConfig,
}

fn default_catalogue_url() -> String {
    "http://books.toscrape.com/catalogue/page-{page}.html".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_rate_url() -> String {
    "https://api.exchangerate-api.com/v4/latest/{base}".to_string()
}

fn default_source_currency() -> Currency {
    Currency::Eur
}

fn default_target_currency() -> Currency {
    Currency::Inr
}

fn default_fallback_rate() -> Decimal {
    Decimal::from(90)
}

fn default_output_path() -> PathBuf {
    PathBuf::from("books_with_prices.csv")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogue_url: default_catalogue_url(),
            user_agent: default_user_agent(),
            proxy: None,
            max_pages: default_max_pages(),
            malformed: MalformedPolicy::default(),
            rate_url: default_rate_url(),
            source_currency: default_source_currency(),
            target_currency: default_target_currency(),
            fallback_rate: default_fallback_rate(),
            output_path: default_output_path(),
            format: OutputFormat::Table,
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Rejects settings no run can use.
    pub fn validate(&self) -> Result<()> {
        if self.fallback_rate <= Decimal::ZERO {
            bail!("fallback_rate must be positive, got {}", self.fallback_rate);
        }
        Ok(())
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("bookwatch.toml");
        if local_config.exists() {
            debug!("Found bookwatch.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bookwatch").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("BOOKWATCH_CATALOGUE_URL") {
            self.catalogue_url = url;
        }

        if let Ok(proxy) = std::env::var("BOOKWATCH_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(output) = std::env::var("BOOKWATCH_OUTPUT") {
            self.output_path = PathBuf::from(output);
        }

        if let Ok(max_pages) = std::env::var("BOOKWATCH_MAX_PAGES") {
            if let Ok(n) = max_pages.parse() {
                self.max_pages = n;
            }
        }

        if let Ok(username) = std::env::var("BOOKWATCH_SMTP_USERNAME") {
            self.mail.username = Some(username);
        }

        if let Ok(password) = std::env::var("BOOKWATCH_SMTP_PASSWORD") {
            self.mail.password = Some(password);
        }

        if let Ok(from) = std::env::var("BOOKWATCH_MAIL_FROM") {
            self.mail.from = Some(from);
        }

        if let Ok(to) = std::env::var("BOOKWATCH_MAIL_TO") {
            self.mail.to = Some(to);
        }

        self
    }

    /// Returns the rate endpoint for the configured source currency.
    pub fn rate_endpoint(&self) -> String {
        self.rate_url.replace("{base}", self.source_currency.code())
    }
}

/// SMTP settings for the summary mail.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Send the summary after a run
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: Option<String>,

    /// Prefer BOOKWATCH_SMTP_PASSWORD over storing this in a file
    #[serde(default)]
    pub password: Option<String>,

    /// Sender address
    #[serde(default)]
    pub from: Option<String>,

    /// Recipient address
    #[serde(default)]
    pub to: Option<String>,

    /// Display name shown next to the sender address
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_true() -> bool {
    true
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "Book Store".to_string()
}

fn default_subject() -> String {
    "New Books Added".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            to: None,
            sender_name: default_sender_name(),
            subject: default_subject(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("enabled", &self.enabled)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("sender_name", &self.sender_name)
            .field("subject", &self.subject)
            .finish()
    }
}

/// Output format for listed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, csv", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalogue_url, "http://books.toscrape.com/catalogue/page-{page}.html");
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(config.max_pages, 1000);
        assert_eq!(config.malformed, MalformedPolicy::Abort);
        assert_eq!(config.source_currency, Currency::Eur);
        assert_eq!(config.target_currency, Currency::Inr);
        assert_eq!(config.fallback_rate, Decimal::from(90));
        assert_eq!(config.output_path, PathBuf::from("books_with_prices.csv"));
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
        assert!(config.mail.enabled);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 587);
        assert!(config.mail.to.is_none());
    }

    #[test]
    fn test_rate_endpoint() {
        let mut config = Config::new();
        assert_eq!(config.rate_endpoint(), "https://api.exchangerate-api.com/v4/latest/EUR");

        config.source_currency = Currency::Gbp;
        assert_eq!(config.rate_endpoint(), "https://api.exchangerate-api.com/v4/latest/GBP");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "xlsx".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, csv"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            max_pages = 5
            malformed = "skip"
            source_currency = "GBP"
            target_currency = "USD"
            fallback_rate = 1.25
            output_path = "out/books.csv"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.malformed, MalformedPolicy::Skip);
        assert_eq!(config.source_currency, Currency::Gbp);
        assert_eq!(config.target_currency, Currency::Usd);
        assert_eq!(config.fallback_rate, Decimal::new(125, 2));
        assert_eq!(config.output_path, PathBuf::from("out/books.csv"));
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_config_from_toml_mail_section() {
        let toml = r#"
            [mail]
            smtp_host = "smtp.example.com"
            smtp_port = 2525
            username = "scraper@example.com"
            from = "scraper@example.com"
            to = "reader@example.com"
            subject = "Fresh books"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.mail.enabled);
        assert_eq!(config.mail.smtp_host, "smtp.example.com");
        assert_eq!(config.mail.smtp_port, 2525);
        assert_eq!(config.mail.to.as_deref(), Some("reader@example.com"));
        assert_eq!(config.mail.subject, "Fresh books");
        assert_eq!(config.mail.sender_name, "Book Store");
        assert!(config.mail.password.is_none());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            catalogue_url = "http://localhost:8080/page-{{page}}.html"
            max_pages = 3
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.catalogue_url, "http://localhost:8080/page-{page}.html");
        assert_eq!(config.max_pages, 3);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_from_file_rejects_non_positive_fallback() {
        for rate in ["-5", "0"] {
            let mut file = NamedTempFile::new().unwrap();
            writeln!(file, "fallback_rate = {}", rate).unwrap();

            let err = Config::from_file(file.path()).unwrap_err();
            assert!(format!("{:#}", err).contains("fallback_rate must be positive"), "{}", rate);
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());

        let config = Config { fallback_rate: Decimal::new(-1, 2), ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_pages = 7").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 7);
    }

    #[test]
    fn test_config_with_env() {
        let vars = [
            ("BOOKWATCH_OUTPUT", "env_books.csv"),
            ("BOOKWATCH_MAX_PAGES", "12"),
            ("BOOKWATCH_SMTP_PASSWORD", "secret"),
            ("BOOKWATCH_MAIL_TO", "env@example.com"),
        ];
        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, std::env::var(k).ok())).collect();

        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let config = Config::new().with_env();
        assert_eq!(config.output_path, PathBuf::from("env_books.csv"));
        assert_eq!(config.max_pages, 12);
        assert_eq!(config.mail.password.as_deref(), Some("secret"));
        assert_eq!(config.mail.to.as_deref(), Some("env@example.com"));

        for (key, original) in originals {
            match original {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_mail_config_debug_redacts_password() {
        let mail = MailConfig { password: Some("hunter2".to_string()), ..MailConfig::default() };
        let debug = format!("{:?}", mail);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            max_pages: 42,
            malformed: MalformedPolicy::Skip,
            fallback_rate: Decimal::new(8975, 2),
            format: OutputFormat::Json,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.max_pages, 42);
        assert_eq!(parsed.malformed, MalformedPolicy::Skip);
        assert_eq!(parsed.fallback_rate, Decimal::new(8975, 2));
        assert_eq!(parsed.format, OutputFormat::Json);
    }
}
