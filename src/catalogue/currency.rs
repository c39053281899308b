//! Currencies used for catalogue prices and conversion targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported currencies with their ISO codes and display symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Gbp,
    Usd,
    Inr,
    Jpy,
    Cad,
    Aud,
    Chf,
}

impl Currency {
    /// Returns the ISO 4217 code, as used by the rate service.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
        }
    }

    /// Returns the symbol prefixed to formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Usd => "$",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
            Currency::Cad => "CA$",
            Currency::Aud => "A$",
            Currency::Chf => "CHF ",
        }
    }

    /// Returns all supported currencies.
    pub fn all() -> &'static [Currency] {
        &[
            Currency::Eur,
            Currency::Gbp,
            Currency::Usd,
            Currency::Inr,
            Currency::Jpy,
            Currency::Cad,
            Currency::Aud,
            Currency::Chf,
        ]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.code() == upper)
            .ok_or_else(|| {
                let codes: Vec<_> = Currency::all().iter().map(|c| c.code()).collect();
                format!("Unknown currency: {}. Supported: {}", s, codes.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!("INR".parse::<Currency>().unwrap(), Currency::Inr);
        assert_eq!(" gbp ".parse::<Currency>().unwrap(), Currency::Gbp);

        let err = "xyz".parse::<Currency>().unwrap_err();
        assert!(err.contains("Unknown currency"));
        assert!(err.contains("EUR"));
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::Inr.symbol(), "₹");
        assert_eq!(Currency::Gbp.symbol(), "£");
    }

    #[test]
    fn test_currency_display_is_code() {
        for currency in Currency::all() {
            assert_eq!(currency.to_string(), currency.code());
        }
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&Currency::Inr).unwrap();
        assert_eq!(json, "\"INR\"");

        let parsed: Currency = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(parsed, Currency::Eur);
    }
}
