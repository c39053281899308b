//! Append-only spreadsheet output.

use crate::catalogue::models::format_amount;
use crate::catalogue::{BookRecord, Currency};
use crate::error::SinkError;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column header written when the spreadsheet is created.
pub const HEADER: [&str; 5] =
    ["Title", "Price(Source)", "Price(Converted)", "Availability", "Rating"];

/// Appends records as rows of a CSV spreadsheet.
pub struct SpreadsheetSink {
    path: PathBuf,
    source: Currency,
    target: Currency,
}

impl SpreadsheetSink {
    /// Creates a sink writing to `path`, labelling prices with the given currencies.
    pub fn new(path: impl Into<PathBuf>, source: Currency, target: Currency) -> Self {
        Self { path: path.into(), source, target }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per record, creating the file with [`HEADER`] if it is
    /// missing or empty. Existing rows are never rewritten.
    pub fn append(&self, records: &[BookRecord]) -> Result<usize, SinkError> {
        info!("Saving data to '{}'...", self.path.display());

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            debug!("Creating spreadsheet with header");
            writer.write_record(HEADER)?;
        }

        for record in records {
            writer.write_record(row(record, self.source, self.target))?;
        }
        writer.flush()?;

        info!("Data saved to '{}' ({} rows).", self.path.display(), records.len());
        Ok(records.len())
    }
}

/// Spreadsheet cells for one record, in [`HEADER`] order.
pub fn row(record: &BookRecord, source: Currency, target: Currency) -> [String; 5] {
    [
        record.title().to_string(),
        format_amount(source.symbol(), record.price_source()),
        format_amount(target.symbol(), record.price_converted()),
        record.availability().to_string(),
        record.rating().label().to_string(),
    ]
}
