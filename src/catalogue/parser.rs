//! Record extraction from catalogue listing pages.

use crate::catalogue::currency::Currency;
use crate::catalogue::models::{BookRecord, Rating};
use crate::catalogue::selectors;
use crate::error::ParseError;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use std::str::FromStr;
use tracing::{debug, trace};

/// Turns listing pages into [`BookRecord`]s priced with a fixed conversion rate.
pub struct RecordExtractor {
    rate: Decimal,
}

impl RecordExtractor {
    /// Creates an extractor that converts prices with `rate`.
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    /// Extracts every listing on the page, in page order.
    ///
    /// Fails on the first listing that lacks a title, price or availability,
    /// or whose price is not a non-negative decimal that converts at the rate.
    pub fn extract(&self, html: &str) -> Result<Vec<BookRecord>, ParseError> {
        self.extract_listings(html).into_iter().collect()
    }

    /// Extracts every listing on the page, keeping per-listing failures.
    pub fn extract_listings(&self, html: &str) -> Vec<Result<BookRecord, ParseError>> {
        let document = Html::parse_document(html);

        let results: Vec<_> = document
            .select(&selectors::LISTING)
            .enumerate()
            .map(|(index, element)| self.parse_listing(index, element))
            .collect();

        debug!("Found {} listings on page", results.len());
        results
    }

    fn parse_listing(&self, index: usize, element: ElementRef) -> Result<BookRecord, ParseError> {
        let title = element
            .select(&selectors::TITLE_LINK)
            .next()
            .map(|link| match link.value().attr(selectors::TITLE_ATTR) {
                Some(title) => title.trim().to_string(),
                None => element_text(link),
            })
            .filter(|title| !title.is_empty())
            .ok_or(ParseError::MissingField { index, field: "title" })?;

        let price_text = element
            .select(&selectors::PRICE)
            .next()
            .map(element_text)
            .ok_or(ParseError::MissingField { index, field: "price" })?;
        let price = parse_price(&price_text)?;

        let availability = element
            .select(&selectors::AVAILABILITY)
            .next()
            .map(element_text)
            .ok_or(ParseError::MissingField { index, field: "availability" })?;

        let rating = self.parse_rating(element);

        trace!("Parsed listing {}: {} ({})", index, title, price);

        BookRecord::new(title, price, self.rate, availability, rating)
    }

    /// Reads the rating label from `star-rating <Label>`, defaulting to unrated.
    fn parse_rating(&self, element: ElementRef) -> Rating {
        let Some(rating) = element.select(&selectors::RATING).next() else {
            return Rating::Unrated;
        };

        let label = rating.value().classes().find(|class| *class != selectors::RATING_CLASS);

        match label.and_then(Rating::from_label) {
            Some(rating) => rating,
            None => {
                debug!("Unrecognised rating label: {:?}", label);
                Rating::Unrated
            }
        }
    }
}

/// Parses a price such as `£51.77` into a decimal.
///
/// Currency symbols (including the multi-letter ones such as `CHF` and `CA$`),
/// whitespace and other non-ASCII characters like a stray `Â` are removed.
/// What remains must be a plain decimal number.
pub fn parse_price(text: &str) -> Result<Decimal, ParseError> {
    let invalid = || ParseError::InvalidPrice { raw: text.to_string() };

    let mut stripped = text.to_string();
    for symbol in currency_symbols() {
        stripped = stripped.replace(symbol, "");
    }

    let cleaned: String =
        stripped.chars().filter(|c| c.is_ascii() && !c.is_whitespace()).collect();

    if cleaned.is_empty()
        || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(invalid());
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| invalid())?;

    if value < Decimal::ZERO {
        return Err(ParseError::NegativePrice { raw: text.to_string() });
    }

    Ok(value)
}

/// Trimmed symbols of every known currency, longest first so `CA$` is
/// removed before `$`.
fn currency_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<_> = Currency::all().iter().map(|c| c.symbol().trim()).collect();
    symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));
    symbols
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
