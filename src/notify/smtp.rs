//! SMTP delivery over STARTTLS.

use crate::config::MailConfig;
use crate::error::NotifyError;
use crate::notify::{Mailer, Summary};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// Sends summaries through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Builds a mailer from `mail`. Requires username, password and recipient;
    /// the sender address defaults to the username.
    pub fn from_config(mail: &MailConfig) -> Result<Self, NotifyError> {
        let username = mail.username.as_deref().ok_or(NotifyError::NotConfigured("username"))?;
        let password = mail.password.as_deref().ok_or(NotifyError::NotConfigured("password"))?;
        let to = mail.to.as_deref().ok_or(NotifyError::NotConfigured("recipient"))?;
        let from = mail.from.as_deref().unwrap_or(username);

        let from = Mailbox::new(Some(mail.sender_name.clone()), from.parse()?);
        let to: Mailbox = to.parse()?;

        debug!("SMTP relay {}:{} as {}", mail.smtp_host, mail.smtp_port, username);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)?
            .port(mail.smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from, to })
    }

    fn build_message(&self, summary: &Summary) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(summary.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(summary.html.clone())?;
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, summary: &Summary) -> Result<(), NotifyError> {
        let message = self.build_message(summary)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mail_config() -> MailConfig {
        MailConfig {
            username: Some("scraper@example.com".to_string()),
            password: Some("app-password".to_string()),
            to: Some("reader@example.com".to_string()),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut mail = make_mail_config();
        mail.password = None;
        assert!(matches!(
            SmtpMailer::from_config(&mail),
            Err(NotifyError::NotConfigured("password"))
        ));

        let mut mail = make_mail_config();
        mail.username = None;
        assert!(matches!(
            SmtpMailer::from_config(&mail),
            Err(NotifyError::NotConfigured("username"))
        ));
    }

    #[test]
    fn test_from_config_requires_recipient() {
        let mut mail = make_mail_config();
        mail.to = None;
        assert!(matches!(
            SmtpMailer::from_config(&mail),
            Err(NotifyError::NotConfigured("recipient"))
        ));
    }

    #[test]
    fn test_from_config_rejects_bad_address() {
        let mut mail = make_mail_config();
        mail.to = Some("not an address".to_string());
        assert!(matches!(SmtpMailer::from_config(&mail), Err(NotifyError::Address(_))));
    }

    #[tokio::test]
    async fn test_message_headers() {
        let mailer = SmtpMailer::from_config(&make_mail_config()).unwrap();
        assert_eq!(mailer.from.email.to_string(), "scraper@example.com");
        assert_eq!(mailer.from.name.as_deref(), Some("Book Store"));

        let summary = Summary {
            subject: "New Books Added".to_string(),
            html: "<html><body>books</body></html>".to_string(),
            rows: 0,
        };
        let message = mailer.build_message(&summary).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: New Books Added"));
        assert!(formatted.contains("To: reader@example.com"));
        assert!(formatted.contains("text/html"));
    }
}
