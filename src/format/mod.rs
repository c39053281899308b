//! Output formatting for listed records (table, JSON, CSV).

use crate::catalogue::models::format_amount;
use crate::catalogue::{BookRecord, Currency};
use crate::config::OutputFormat;
use crate::sink::{self, HEADER};

/// Formats records for terminal output.
pub struct Formatter {
    format: OutputFormat,
    source: Currency,
    target: Currency,
}

impl Formatter {
    pub fn new(format: OutputFormat, source: Currency, target: Currency) -> Self {
        Self { format, source, target }
    }

    /// Formats a list of records.
    pub fn format_records(&self, records: &[BookRecord]) -> String {
        match self.format {
            OutputFormat::Json if records.is_empty() => "[]".to_string(),
            OutputFormat::Table if records.is_empty() => "No books found.".to_string(),
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Csv => self.csv_records(records).unwrap_or_else(|_| HEADER.join(",")),
        }
    }

    fn json_records(&self, records: &[BookRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    fn table_records(&self, records: &[BookRecord]) -> String {
        let title_width = 50;
        let price_width = 12;
        let stock_width = 14;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<title_width$}  {:>price_width$}  {:>price_width$}  {:<stock_width$}  {}",
            "Title",
            format!("Price ({})", self.source.code()),
            format!("Price ({})", self.target.code()),
            "Availability",
            "Rating"
        ));
        lines.push(format!(
            "{:-<title_width$}  {:-<price_width$}  {:-<price_width$}  {:-<stock_width$}  {:-<9}",
            "", "", "", "", ""
        ));

        for record in records {
            lines.push(format!(
                "{:<title_width$}  {:>price_width$}  {:>price_width$}  {:<stock_width$}  {}",
                truncate(record.title(), title_width),
                format_amount(self.source.symbol(), record.price_source()),
                format_amount(self.target.symbol(), record.price_converted()),
                truncate(record.availability(), stock_width),
                record.rating()
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} books", records.len()));

        lines.join("\n")
    }

    fn csv_records(&self, records: &[BookRecord]) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

        writer.write_record(HEADER)?;
        for record in records {
            writer.write_record(sink::row(record, self.source, self.target))?;
        }

        let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
        let output = String::from_utf8_lossy(&bytes);
        Ok(output.strip_suffix('\n').unwrap_or(&output).to_string())
    }
}

/// Shortens `s` to `width` characters, ending with `...` when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
