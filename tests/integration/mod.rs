// Shared fixtures for the integration tests

pub mod pass_tests;

use async_trait::async_trait;
use stock_watch::config::{
    Credentials, NotificationsConfig, RegionTarget, ResendConfig, ScraperConfig, TargetsConfig,
};
use stock_watch::scheduler::Ticker;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SOLD_OUT_S_OPEN_SM: &str = r#"
<html>
  <body>
    <form id="product-form">
      <fieldset class="product-form__input">
        <legend>Size</legend>
        <input type="radio" id="opt-s" name="Size" value="S" class="disabled">
        <label for="opt-s">S</label>
        <input type="radio" id="opt-sm" name="Size" value="S/M">
        <label for="opt-sm">S/M</label>
      </fieldset>
    </form>
  </body>
</html>
"#;

pub const ALL_SOLD_OUT: &str = r#"
<form>
  <input type="radio" name="Size" value="S" class="swatch disabled">
  <input type="radio" name="Size" value='S/M' class='disabled'>
</form>
"#;

pub const NO_SIZE_INPUTS: &str = "<html><body><h1>Elle White Dress</h1><p>Coming soon</p></body></html>";

/// Test scraper settings: short timeout so slow-page tests stay fast.
pub fn get_test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        request_timeout: 1,
        navigation_timeout: 5,
        settle_delay_ms: 0,
        chrome_path: None,
    }
}

pub fn get_test_targets(server: &MockServer, regions: &[&str]) -> TargetsConfig {
    TargetsConfig {
        regions: regions
            .iter()
            .map(|label| RegionTarget {
                label: label.to_string(),
                url: format!("{}/{}/products/elle-white-dress", server.uri(), label.to_lowercase()),
            })
            .collect(),
        sizes: vec!["S".to_string(), "S/M".to_string()],
    }
}

pub fn get_test_credentials(with_api_key: bool) -> Credentials {
    Credentials {
        email_address: Some("watcher@gmail.com".to_string()),
        email_password: Some("app-password".to_string()),
        to_email: Some("buyer@example.com".to_string()),
        resend_api_key: with_api_key.then(|| "re_integration_key".to_string()),
        resend_from: None,
    }
}

pub fn get_test_notifications(server: &MockServer) -> NotificationsConfig {
    NotificationsConfig {
        resend: ResendConfig {
            api_base: server.uri(),
            request_timeout: 5,
        },
        ..NotificationsConfig::default()
    }
}

/// Mounts a product page for one region.
pub async fn mount_page(server: &MockServer, region: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/products/elle-white-dress", region.to_lowercase())))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Ticker that allows a fixed number of extra passes with no wait.
pub struct BoundedTicker {
    pub remaining: usize,
}

#[async_trait]
impl Ticker for BoundedTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
