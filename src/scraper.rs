use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use reqwest::Client;
use std::ffi::OsStr;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::plugins::trackers::{Availability, SizeDetector};
use crate::plugins::traits::{FetchStrategy, PageSource, SizeStatus};
use crate::utils::error::AppError;
use crate::Result;

/// Fetches raw HTML with a plain GET and runs the regex detector over it.
pub struct StaticFetcher {
    client: Client,
    detector: SizeDetector,
}

impl StaticFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            detector: SizeDetector::new(),
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for StaticFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Static
    }

    async fn probe(&self, url: &str, sizes: &[String]) -> Result<Vec<SizeStatus>> {
        let html = self.fetch(url).await?;
        tracing::debug!("Fetched {} bytes from {}", html.len(), url);

        Ok(self
            .detector
            .detect_all(&html, sizes)
            .into_iter()
            .map(|(size, availability)| SizeStatus::new(size, availability))
            .collect())
    }
}

/// Renders the page in a throwaway headless Chromium and reads each size
/// input's class list from the live DOM.
pub struct BrowserFetcher {
    config: ScraperConfig,
}

impl BrowserFetcher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn launch(config: &ScraperConfig) -> Result<Browser> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))
    }

    /// Blocking. The browser process lives exactly as long as this call:
    /// dropping `browser` on any return path kills it.
    fn render_and_query(
        config: &ScraperConfig,
        url: &str,
        sizes: &[String],
    ) -> Result<Vec<SizeStatus>> {
        let browser = Self::launch(config)?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.navigation_timeout));

        tab.navigate_to(url)
            .map_err(|e| AppError::Browser(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| AppError::Browser(format!("Page load failed: {}", e)))?;

        std::thread::sleep(Duration::from_millis(config.settle_delay_ms));

        let mut statuses = Vec::with_capacity(sizes.len());
        for size in sizes {
            let selector = size_selector(size);
            let availability = match tab.find_element(&selector) {
                Ok(element) => match element.get_attribute_value("class") {
                    Ok(classes) => Availability::from_class_list(classes.as_deref()),
                    Err(e) => {
                        tracing::debug!("  Debug: {} - {}", size, e);
                        Availability::NotFound
                    }
                },
                Err(e) => {
                    tracing::debug!("  Debug: {} - {}", size, e);
                    Availability::NotFound
                }
            };
            statuses.push(SizeStatus::new(size.clone(), availability));
        }

        let _ = tab.close(true);
        Ok(statuses)
    }
}

#[async_trait]
impl PageSource for BrowserFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Browser
    }

    async fn probe(&self, url: &str, sizes: &[String]) -> Result<Vec<SizeStatus>> {
        let config = self.config.clone();
        let url = url.to_string();
        let sizes = sizes.to_vec();

        tokio::task::spawn_blocking(move || Self::render_and_query(&config, &url, &sizes))
            .await
            .map_err(|e| AppError::Internal(format!("Browser task failed: {}", e)))?
    }
}

/// CSS selector for the size radio input carrying `size` as its value.
pub fn size_selector(size: &str) -> String {
    let escaped = size.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"input[name="Size"][value="{}"]"#, escaped)
}

pub fn build_source(
    strategy: FetchStrategy,
    config: &ScraperConfig,
) -> Result<Box<dyn PageSource>> {
    match strategy {
        FetchStrategy::Static => Ok(Box::new(StaticFetcher::new(config)?)),
        FetchStrategy::Browser => Ok(Box::new(BrowserFetcher::new(config.clone()))),
    }
}
