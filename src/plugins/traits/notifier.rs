use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;

/// A size that became purchasable in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub subject: String,
    pub size: String,
    pub region: String,
    pub url: String,
}

impl StockAlert {
    pub fn new(
        subject: impl Into<String>,
        size: impl Into<String>,
        region: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            size: size.into(),
            region: region.into(),
            url: url.into(),
        }
    }

    pub fn text_body(&self) -> String {
        format!(
            "🚨 Size {} is now IN STOCK ({} store)!\n\nBuy it here:\n{}",
            self.size, self.region, self.url
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Smtp,
    Resend,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Smtp => f.write_str("smtp"),
            Transport::Resend => f.write_str("resend"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub transport: Transport,
    pub message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Delivers stock alerts. One call sends at most one message; there is no
/// retry or queueing behind it.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn transport(&self) -> Transport;

    async fn notify(&self, alert: &StockAlert) -> Result<NotificationReceipt>;
}
