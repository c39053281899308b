//! Pagination over the catalogue.
//!
//! [`PageCursor`] yields page bodies until the source runs dry, and
//! [`CatalogWalker`] turns those pages into records.

use crate::catalogue::client::CatalogueSource;
use crate::catalogue::models::BookRecord;
use crate::catalogue::parser::RecordExtractor;
use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Upper bound on pages fetched in one walk.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// What to do with a listing that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole walk.
    #[default]
    Abort,
    /// Log a warning and drop the listing.
    Skip,
}

impl FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(MalformedPolicy::Abort),
            "skip" => Ok(MalformedPolicy::Skip),
            _ => Err(format!("Unknown malformed listing policy: {}. Use: abort, skip", s)),
        }
    }
}

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Page fetched fine but had no listings.
    EmptyPage { page: u32 },
    /// The source reported that the page does not exist.
    EndOfCatalogue { page: u32 },
    /// The request for the page failed.
    FetchFailed { page: u32, reason: String },
    /// `max_pages` pages were fetched without reaching the end.
    PageLimit { max_pages: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage { page } => write!(f, "page {} has no listings", page),
            StopReason::EndOfCatalogue { page } => write!(f, "page {} does not exist", page),
            StopReason::FetchFailed { page, reason } => {
                write!(f, "fetching page {} failed: {}", page, reason)
            }
            StopReason::PageLimit { max_pages } => write!(f, "reached page limit of {}", max_pages),
        }
    }
}

/// One step of a [`PageCursor`].
#[derive(Debug)]
pub enum CursorStep {
    Page { number: u32, html: String },
    Exhausted(StopReason),
}

/// Lazy, bounded sequence of catalogue pages starting at page 1.
///
/// Once exhausted, every further call returns the same stop reason without
/// touching the source.
pub struct PageCursor<'a, S: CatalogueSource + ?Sized> {
    source: &'a S,
    next: u32,
    max_pages: u32,
    fetched: u32,
    stopped: Option<StopReason>,
}

impl<'a, S: CatalogueSource + ?Sized> PageCursor<'a, S> {
    pub fn new(source: &'a S, max_pages: u32) -> Self {
        Self { source, next: 1, max_pages, fetched: 0, stopped: None }
    }

    /// Fetches the next page, or reports why there are no more.
    pub async fn next_page(&mut self) -> CursorStep {
        if let Some(reason) = &self.stopped {
            return CursorStep::Exhausted(reason.clone());
        }

        if self.next > self.max_pages {
            warn!("Stopping after {} pages without reaching the end", self.max_pages);
            return self.stop(StopReason::PageLimit { max_pages: self.max_pages });
        }

        let number = self.next;
        self.fetched += 1;

        match self.source.fetch_page(number).await {
            Ok(Some(html)) => {
                self.next += 1;
                CursorStep::Page { number, html }
            }
            Ok(None) => {
                info!("No more pages to scrape. Exiting...");
                self.stop(StopReason::EndOfCatalogue { page: number })
            }
            Err(e) => {
                warn!("Error while fetching the page: {}", e);
                self.stop(StopReason::FetchFailed { page: number, reason: e.to_string() })
            }
        }
    }

    /// Ends the sequence early, e.g. because the caller found an empty page.
    pub fn stop(&mut self, reason: StopReason) -> CursorStep {
        self.stopped = Some(reason.clone());
        CursorStep::Exhausted(reason)
    }

    /// Number of fetch calls made so far.
    pub fn fetched(&self) -> u32 {
        self.fetched
    }
}

/// Result of walking the catalogue.
#[derive(Debug)]
pub struct Walk {
    /// Records from every page, in page order then listing order.
    pub records: Vec<BookRecord>,
    /// Number of fetch calls made, including the one that ended the walk.
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Walks catalogue pages from page 1 until the catalogue is exhausted.
pub struct CatalogWalker<'a, S: CatalogueSource + ?Sized> {
    source: &'a S,
    extractor: RecordExtractor,
    max_pages: u32,
    policy: MalformedPolicy,
}

impl<'a, S: CatalogueSource + ?Sized> CatalogWalker<'a, S> {
    pub fn new(source: &'a S, extractor: RecordExtractor) -> Self {
        Self { source, extractor, max_pages: DEFAULT_MAX_PAGES, policy: MalformedPolicy::default() }
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Collects every record in the catalogue.
    ///
    /// Fetch failures and empty pages end the walk normally. A malformed
    /// listing fails it under [`MalformedPolicy::Abort`].
    pub async fn walk(&self) -> Result<Walk, ScrapeError> {
        let mut cursor = PageCursor::new(self.source, self.max_pages);
        let mut records = Vec::new();

        let stop = loop {
            let (number, html) = match cursor.next_page().await {
                CursorStep::Page { number, html } => (number, html),
                CursorStep::Exhausted(reason) => break reason,
            };

            let listings = self.extractor.extract_listings(&html);
            if listings.is_empty() {
                info!("No books on page {}, stopping", number);
                cursor.stop(StopReason::EmptyPage { page: number });
                break StopReason::EmptyPage { page: number };
            }

            let before = records.len();
            for listing in listings {
                match listing {
                    Ok(record) => records.push(record),
                    Err(source) => match self.policy {
                        MalformedPolicy::Abort => {
                            return Err(ScrapeError::Parse { page: number, source });
                        }
                        MalformedPolicy::Skip => {
                            warn!("Skipping malformed listing on page {}: {}", number, source);
                        }
                    },
                }
            }

            debug!("Page {} yielded {} records", number, records.len() - before);
        };

        info!("Collected {} books from {} page requests ({})", records.len(), cursor.fetched(), stop);

        Ok(Walk { records, pages_fetched: cursor.fetched(), stop })
    }
}
