use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::{Credentials, ResendConfig};
use crate::plugins::traits::{NotificationReceipt, Notifier, StockAlert, Transport};
use crate::utils::error::AppError;
use crate::Result;

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Sends alerts through the Resend transactional email API.
pub struct ResendNotifier {
    client: Client,
    settings: ResendConfig,
    api_key: String,
    credentials: Credentials,
}

impl ResendNotifier {
    pub fn new(settings: ResendConfig, api_key: String, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .build()?;

        Ok(ResendNotifier {
            client,
            settings,
            api_key,
            credentials,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.settings.api_base.trim_end_matches('/'))
    }

    fn create_payload(&self, alert: &StockAlert) -> Result<serde_json::Value> {
        let from = self
            .credentials
            .resend_sender()
            .ok_or_else(|| AppError::missing(Credentials::RESEND_FROM))?;
        let to = self
            .credentials
            .to_email
            .as_deref()
            .ok_or_else(|| AppError::missing(Credentials::TO_EMAIL))?;

        Ok(json!({
            "from": from,
            "to": [to],
            "subject": alert.subject,
            "text": alert.text_body(),
        }))
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    fn transport(&self) -> Transport {
        Transport::Resend
    }

    async fn notify(&self, alert: &StockAlert) -> Result<NotificationReceipt> {
        let payload = self.create_payload(alert)?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmailApi {
                status: status.as_u16(),
                body,
            });
        }

        let body: SendResponse = serde_json::from_str(&response.text().await?)?;

        Ok(NotificationReceipt {
            transport: Transport::Resend,
            message_id: body.id,
            sent_at: chrono::Utc::now(),
        })
    }
}
