//! Error types for each stage of a run.
//!
//! Only [`ScrapeError`] and [`SinkError`] abort a run. Fetch, rate and
//! notification failures are recovered by their callers.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure while requesting one catalogue page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for page {page} failed: {reason}")]
    Transport { page: u32, reason: String },

    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },
}

/// A listing on an otherwise well-formed page could not be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("listing {index} has no {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("invalid price: {raw:?}")]
    InvalidPrice { raw: String },

    #[error("negative price: {raw:?}")]
    NegativePrice { raw: String },

    #[error("price {price} cannot be converted at rate {rate}")]
    PriceOutOfRange { price: Decimal, rate: Decimal },
}

/// The walk stopped because of a malformed listing.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to parse page {page}: {source}")]
    Parse {
        page: u32,
        #[source]
        source: ParseError,
    },
}

/// Live exchange rate lookup failed.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Transport(String),

    #[error("rate service returned HTTP {0}")]
    Status(u16),

    #[error("malformed rate payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no rate for {0} in payload")]
    MissingRate(String),

    #[error("rate must be positive, got {0}")]
    NonPositive(String),
}

/// Writing records to the spreadsheet file failed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("spreadsheet io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Building or delivering the summary mail failed.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_error_names_page() {
        let err = ScrapeError::Parse {
            page: 3,
            source: ParseError::InvalidPrice { raw: "N/A".to_string() },
        };
        let msg = err.to_string();
        assert!(msg.contains("page 3"));
        assert!(msg.contains("N/A"));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status { page: 7, status: 500 };
        assert_eq!(err.to_string(), "page 7 returned HTTP 500");
    }
}
