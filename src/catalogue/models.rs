//! Data models for catalogue listings.

use crate::error::ParseError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Star rating label as printed by the catalogue (`star-rating Three`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    One,
    Two,
    Three,
    Four,
    Five,
    #[serde(rename = "No rating")]
    Unrated,
}

impl Rating {
    /// Maps a CSS class label to a rating. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "One" => Some(Rating::One),
            "Two" => Some(Rating::Two),
            "Three" => Some(Rating::Three),
            "Four" => Some(Rating::Four),
            "Five" => Some(Rating::Five),
            _ => None,
        }
    }

    /// Returns the label written to the spreadsheet and the summary mail.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::One => "One",
            Rating::Two => "Two",
            Rating::Three => "Three",
            Rating::Four => "Four",
            Rating::Five => "Five",
            Rating::Unrated => "No rating",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One book extracted from a catalogue page.
///
/// Fields are private so a record cannot change after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    title: String,
    price_source: Decimal,
    price_converted: Decimal,
    availability: String,
    rating: Rating,
}

impl BookRecord {
    /// Builds a record, converting `price_source` with `rate` and rounding to cents.
    ///
    /// Fails if the converted price does not fit in a [`Decimal`].
    pub fn new(
        title: impl Into<String>,
        price_source: Decimal,
        rate: Decimal,
        availability: impl Into<String>,
        rating: Rating,
    ) -> Result<Self, ParseError> {
        let price_converted = convert(price_source, rate)
            .ok_or(ParseError::PriceOutOfRange { price: price_source, rate })?;

        Ok(Self {
            title: title.into(),
            price_source,
            price_converted,
            availability: availability.into(),
            rating,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price_source(&self) -> Decimal {
        self.price_source
    }

    pub fn price_converted(&self) -> Decimal {
        self.price_converted
    }

    pub fn availability(&self) -> &str {
        &self.availability
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }
}

/// `amount × rate`, rounded half away from zero to two fractional digits.
///
/// Returns `None` on overflow.
pub fn convert(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|product| product.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Formats an amount as `<symbol><amount>` with two decimals, e.g. `€51.77`.
pub fn format_amount(symbol: &str, amount: Decimal) -> String {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", symbol, amount)
}
