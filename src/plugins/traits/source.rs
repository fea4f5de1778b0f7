use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::plugins::trackers::Availability;
use crate::Result;

/// How product pages are retrieved and inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Plain HTTP GET, regex over the raw markup.
    Static,
    /// Headless Chromium, DOM query after rendering.
    Browser,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Static => f.write_str("static"),
            FetchStrategy::Browser => f.write_str("browser"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStatus {
    pub size: String,
    pub availability: Availability,
}

impl SizeStatus {
    pub fn new(size: impl Into<String>, availability: Availability) -> Self {
        Self {
            size: size.into(),
            availability,
        }
    }
}

/// Retrieves one product page and reports the state of each requested size,
/// in the order the sizes were given.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn strategy(&self) -> FetchStrategy;

    async fn probe(&self, url: &str, sizes: &[String]) -> Result<Vec<SizeStatus>>;
}
