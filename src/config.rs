use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Write as _};
use std::path::Path;
use url::Url;

use crate::monitor::NotifyPolicy;
use crate::plugins::traits::FetchStrategy;

pub const DEFAULT_PRODUCT_URL: &str = "https://www.nadinemerabi.com/products/elle-white-dress";
pub const DEFAULT_SIZES: [&str; 2] = ["S", "S/M"];
pub const DEFAULT_ALERT_SUBJECT: &str = "Elle White Dress Available!";
pub const DEFAULT_CONFIG_FILE: &str = "config/stock-watch";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub targets: TargetsConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationsConfig,
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_secs: u64,
    pub notify_policy: NotifyPolicy,
    pub fetch_strategy: FetchStrategy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
            notify_policy: NotifyPolicy::Once,
            fetch_strategy: FetchStrategy::Static,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTarget {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub regions: Vec<RegionTarget>,
    pub sizes: Vec<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            regions: vec![RegionTarget {
                label: "US".to_string(),
                url: DEFAULT_PRODUCT_URL.to_string(),
            }],
            sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Timeout for a plain GET, in seconds.
    pub request_timeout: u64,
    /// Timeout for browser navigation, in seconds.
    pub navigation_timeout: u64,
    /// Pause after DOM content loads so client-side rendering can settle.
    pub settle_delay_ms: u64,
    pub chrome_path: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 20,
            navigation_timeout: 60,
            settle_delay_ms: 1500,
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub subject: Option<String>,
    pub smtp: SmtpConfig,
    pub resend: ResendConfig,
}

impl NotificationsConfig {
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or(DEFAULT_ALERT_SUBJECT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Budget for the TCP reachability probe and the SMTP session, in seconds.
    pub connect_timeout: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            connect_timeout: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResendConfig {
    pub api_base: String,
    pub request_timeout: u64,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.resend.com".to_string(),
            request_timeout: 20,
        }
    }
}

/// Mail credentials read from the process environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub email_address: Option<String>,
    pub email_password: Option<String>,
    pub to_email: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_from: Option<String>,
}

impl Credentials {
    pub const EMAIL_ADDRESS: &'static str = "EMAIL_ADDRESS";
    pub const EMAIL_PASSWORD: &'static str = "EMAIL_PASSWORD";
    pub const TO_EMAIL: &'static str = "TO_EMAIL";
    pub const RESEND_API_KEY: &'static str = "RESEND_API_KEY";
    pub const RESEND_FROM: &'static str = "RESEND_FROM";

    pub fn from_env() -> Self {
        Self {
            email_address: non_empty_var(Self::EMAIL_ADDRESS),
            email_password: non_empty_var(Self::EMAIL_PASSWORD),
            to_email: non_empty_var(Self::TO_EMAIL),
            resend_api_key: non_empty_var(Self::RESEND_API_KEY),
            resend_from: non_empty_var(Self::RESEND_FROM),
        }
    }

    /// Sender used by the email API; falls back to the SMTP sender address.
    pub fn resend_sender(&self) -> Option<&str> {
        self.resend_from
            .as_deref()
            .or(self.email_address.as_deref())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email_address", &self.email_address)
            .field("email_password", &mask(self.email_password.as_deref()))
            .field("to_email", &self.to_email)
            .field("resend_api_key", &mask(self.resend_api_key.as_deref()))
            .field("resend_from", &self.resend_from)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn mask(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "****",
        None => "<unset>",
    }
}

impl AppConfig {
    /// Loads defaults, the optional config file and `STOCK_WATCH__*` overrides,
    /// then attaches credentials from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let s = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("STOCK_WATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }
        config.credentials = Credentials::from_env();

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.regions.is_empty() {
            return Err(ConfigError::Message("At least one region must be configured".into()));
        }

        for region in &self.targets.regions {
            if region.label.trim().is_empty() {
                return Err(ConfigError::Message("Region label must not be empty".into()));
            }
            match Url::parse(&region.url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                _ => {
                    return Err(ConfigError::Message(format!(
                        "Invalid URL for region {}: {}",
                        region.label, region.url
                    )));
                }
            }
        }

        if self.targets.sizes.is_empty() {
            return Err(ConfigError::Message("At least one target size must be configured".into()));
        }

        if self.targets.sizes.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Message("Size labels must not be empty".into()));
        }

        if self.monitor.interval_secs == 0 {
            return Err(ConfigError::Message("Monitor interval_secs must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 || self.scraper.navigation_timeout == 0 {
            return Err(ConfigError::Message("Scraper timeouts must be greater than 0".into()));
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        let notifications = &self.notifications;
        if notifications.smtp.connect_timeout == 0 || notifications.resend.request_timeout == 0 {
            return Err(ConfigError::Message("Notification timeouts must be greater than 0".into()));
        }

        if Url::parse(&self.notifications.resend.api_base).is_err() {
            return Err(ConfigError::Message("Invalid email API base URL".into()));
        }

        Ok(())
    }

    /// Human-readable dump for `--verbose`, secrets masked.
    pub fn redacted(&self) -> String {
        let c = &self.credentials;
        let mut out = String::new();
        let _ = writeln!(out, "fetch strategy: {}", self.monitor.fetch_strategy);
        let _ = writeln!(out, "notify policy: {}", self.monitor.notify_policy);
        let _ = writeln!(out, "interval: {}s", self.monitor.interval_secs);
        for region in &self.targets.regions {
            let _ = writeln!(out, "region {}: {}", region.label, region.url);
        }
        let _ = writeln!(out, "sizes: {}", self.targets.sizes.join(", "));
        let lines = [
            (Credentials::EMAIL_ADDRESS, c.email_address.as_deref().unwrap_or("<unset>")),
            (Credentials::EMAIL_PASSWORD, mask(c.email_password.as_deref())),
            (Credentials::TO_EMAIL, c.to_email.as_deref().unwrap_or("<unset>")),
            (Credentials::RESEND_API_KEY, mask(c.resend_api_key.as_deref())),
            (Credentials::RESEND_FROM, c.resend_sender().unwrap_or("<unset>")),
        ];
        let _ = write!(
            out,
            "{}",
            lines
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
        out
    }
}
