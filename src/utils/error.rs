use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing credential: {name} is not set")]
    MissingCredential { name: String },

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    EmailBuild(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Cannot reach SMTP server {host}:{port} ({reason}); network likely blocks outbound SMTP")]
    SmtpUnreachable {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("SMTP session with {host}:{port} timed out after {secs}s")]
    SmtpTimeout { host: String, port: u16, secs: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Email API rejected request: {status}: {body}")]
    EmailApi { status: u16, body: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Fetch error: {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn missing(name: &str) -> Self {
        AppError::MissingCredential {
            name: name.to_string(),
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
