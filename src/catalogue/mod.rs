//! Catalogue modules for fetching, parsing and walking listing pages.

pub mod client;
pub mod currency;
pub mod models;
pub mod parser;
pub mod selectors;
pub mod walker;

pub use client::{CatalogueClient, CatalogueSource};
pub use currency::Currency;
pub use models::{BookRecord, Rating};
pub use parser::RecordExtractor;
pub use walker::{CatalogWalker, MalformedPolicy, StopReason, Walk};
