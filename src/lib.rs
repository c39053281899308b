//! bookwatch - book catalogue scraper
//!
//! Walks a paginated catalogue, converts prices with a live exchange rate,
//! appends the records to a spreadsheet and mails a short summary.

pub mod catalogue;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod notify;
pub mod rates;
pub mod sink;

pub use catalogue::{BookRecord, Currency, Rating};
pub use config::Config;
