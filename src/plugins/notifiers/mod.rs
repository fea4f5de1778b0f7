// Notifier implementations
pub mod email;
pub mod resend;

pub use email::SmtpNotifier;
pub use resend::ResendNotifier;

use crate::config::{Credentials, NotificationsConfig};
use crate::plugins::traits::Notifier;
use crate::Result;

/// Picks the mail transport from the configured credentials. An email API
/// key wins outright; SMTP is only used when no key is present.
pub fn select_notifier(
    settings: &NotificationsConfig,
    credentials: &Credentials,
) -> Result<Box<dyn Notifier>> {
    match &credentials.resend_api_key {
        Some(api_key) => Ok(Box::new(ResendNotifier::new(
            settings.resend.clone(),
            api_key.clone(),
            credentials.clone(),
        )?)),
        None => Ok(Box::new(SmtpNotifier::new(settings.smtp.clone(), credentials.clone()))),
    }
}
