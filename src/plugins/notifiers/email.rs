use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::{Credentials, SmtpConfig};
use crate::plugins::traits::{NotificationReceipt, Notifier, StockAlert, Transport};
use crate::utils::error::AppError;
use crate::Result;

/// Password-authenticated SMTP submission with an explicit STARTTLS upgrade.
pub struct SmtpNotifier {
    settings: SmtpConfig,
    credentials: Credentials,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpConfig, credentials: Credentials) -> Self {
        SmtpNotifier {
            settings,
            credentials,
        }
    }

    fn sender(&self) -> Result<&str> {
        self.credentials
            .email_address
            .as_deref()
            .ok_or_else(|| AppError::missing(Credentials::EMAIL_ADDRESS))
    }

    fn password(&self) -> Result<&str> {
        self.credentials
            .email_password
            .as_deref()
            .ok_or_else(|| AppError::missing(Credentials::EMAIL_PASSWORD))
    }

    fn recipient(&self) -> Result<&str> {
        self.credentials
            .to_email
            .as_deref()
            .ok_or_else(|| AppError::missing(Credentials::TO_EMAIL))
    }

    fn build_message(&self, alert: &StockAlert) -> Result<Message> {
        let from: Mailbox = self.sender()?.parse()?;
        let to: Mailbox = self.recipient()?.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.text_body())?;

        Ok(email)
    }

    /// Plain TCP connect to the submission port. Many hosting networks drop
    /// outbound SMTP; failing here separates that case from bad credentials.
    async fn check_reachable(&self) -> Result<()> {
        let host = self.settings.host.as_str();
        let port = self.settings.port;
        let budget = Duration::from_secs(self.settings.connect_timeout);

        match tokio::time::timeout(budget, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(AppError::SmtpUnreachable {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            }),
            Err(_) => Err(AppError::SmtpUnreachable {
                host: host.to_string(),
                port,
                reason: format!("timed out after {}s", self.settings.connect_timeout),
            }),
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn transport(&self) -> Transport {
        Transport::Smtp
    }

    async fn notify(&self, alert: &StockAlert) -> Result<NotificationReceipt> {
        let email = self.build_message(alert)?;
        let credentials =
            SmtpCredentials::new(self.sender()?.to_string(), self.password()?.to_string());

        self.check_reachable().await?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.settings.connect_timeout)))
            .build();

        // bounds the whole session, including a server that never greets
        let budget = Duration::from_secs(self.settings.connect_timeout);
        let response = match tokio::time::timeout(budget, mailer.send(email)).await {
            Ok(sent) => sent?,
            Err(_) => {
                return Err(AppError::SmtpTimeout {
                    host: self.settings.host.clone(),
                    port: self.settings.port,
                    secs: self.settings.connect_timeout,
                });
            }
        };
        tracing::debug!("SMTP server accepted message: {:?}", response.code());

        Ok(NotificationReceipt {
            transport: Transport::Smtp,
            message_id: response.first_line().map(|line| line.to_string()),
            sent_at: chrono::Utc::now(),
        })
    }
}
