//! Summary mail for books collected in a run.

pub mod smtp;

use crate::catalogue::models::format_amount;
use crate::catalogue::{BookRecord, Currency};
use crate::error::NotifyError;
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use smtp::SmtpMailer;

/// Maximum number of books listed in one summary.
pub const SUMMARY_ROW_LIMIT: usize = 10;

/// A rendered summary ready for delivery.
#[derive(Debug, Clone)]
pub struct Summary {
    pub subject: String,
    pub html: String,
    /// Number of book rows in the table.
    pub rows: usize,
}

/// Delivers a rendered summary - enables fake mailers in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, summary: &Summary) -> Result<(), NotifyError>;
}

/// Renders and sends the summary mail. Delivery failures are logged, never returned.
pub struct Notifier {
    mailer: Option<Box<dyn Mailer>>,
    subject: String,
    source: Currency,
    target: Currency,
}

impl Notifier {
    pub fn new(
        mailer: impl Mailer + 'static,
        subject: impl Into<String>,
        source: Currency,
        target: Currency,
    ) -> Self {
        Self { mailer: Some(Box::new(mailer)), subject: subject.into(), source, target }
    }

    /// A notifier that renders nothing and sends nothing.
    pub fn disabled(source: Currency, target: Currency) -> Self {
        Self { mailer: None, subject: String::new(), source, target }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Renders the first [`SUMMARY_ROW_LIMIT`] records as an HTML table.
    pub fn render(&self, records: &[BookRecord]) -> Summary {
        let shown = &records[..records.len().min(SUMMARY_ROW_LIMIT)];

        let mut html = String::from(
            "<html>\n<body>\n<h2>The following new books were added:</h2>\n\
             <table border=\"1\" cellpadding=\"10\" cellspacing=\"0\" style=\"border-collapse: collapse;\">\n",
        );

        html.push_str(&format!(
            "<tr><th>Title</th><th>Price ({})</th><th>Price ({})</th><th>Availability</th><th>Rating</th></tr>\n",
            self.source.code(),
            self.target.code()
        ));

        for record in shown {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(record.title()),
                format_amount(self.source.symbol(), record.price_source()),
                format_amount(self.target.symbol(), record.price_converted()),
                escape_html(record.availability()),
                record.rating().label()
            ));
        }

        html.push_str("</table>\n</body>\n</html>\n");

        Summary { subject: self.subject.clone(), html, rows: shown.len() }
    }

    /// Sends a summary of `records`. Returns true if a mail was delivered.
    pub async fn notify(&self, records: &[BookRecord]) -> bool {
        let Some(mailer) = &self.mailer else {
            debug!("Email notifications disabled");
            return false;
        };

        if records.is_empty() {
            debug!("No new books, skipping email");
            return false;
        }

        let summary = self.render(records);

        info!("Sending email with {} of {} books...", summary.rows, records.len());
        match mailer.send(&summary).await {
            Ok(()) => {
                info!("Email sent successfully.");
                true
            }
            Err(e) => {
                warn!("Failed to send email: {}", e);
                false
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
