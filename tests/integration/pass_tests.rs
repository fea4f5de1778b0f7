use super::*;
use std::time::Duration;
use stock_watch::monitor::{AlertState, NotifyPolicy, StockMonitor};
use stock_watch::plugins::select_notifier;
use stock_watch::plugins::traits::FetchStrategy;
use stock_watch::scheduler::run_monitor;
use stock_watch::scraper::build_source;

async fn mount_email_api(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "msg_123" })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn build_monitor(server: &MockServer, regions: &[&str], policy: NotifyPolicy) -> StockMonitor {
    let source = build_source(FetchStrategy::Static, &get_test_scraper_config()).unwrap();
    let notifier = select_notifier(&get_test_notifications(server), &get_test_credentials(true)).unwrap();
    StockMonitor::new(source, notifier, get_test_targets(server, regions), policy)
}

async fn sent_email_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/emails")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_one_size_back_in_stock() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "US", SOLD_OUT_S_OPEN_SM).await;
    mount_email_api(&server, 1).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::Once);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert_eq!(report.unavailable.len(), 1);
    assert_eq!(report.unavailable[0].size, "S");
    assert_eq!(report.available.len(), 1);
    assert_eq!(report.available[0].size, "S/M");
    assert_eq!(report.notifications_sent, 1);

    let emails = sent_email_bodies(&server).await;
    assert_eq!(emails.len(), 1);
    let text = emails[0]["text"].as_str().unwrap();
    assert!(text.contains("Size S/M is now IN STOCK"));
    assert!(text.contains("/us/products/elle-white-dress"));
    assert_eq!(emails[0]["subject"], "Elle White Dress Available!");
    Ok(())
}

#[tokio::test]
async fn test_page_without_sizes_sends_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "US", NO_SIZE_INPUTS).await;
    mount_email_api(&server, 0).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::EveryPass);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert!(report.all_sold_out());
    assert!(report.unavailable.is_empty());
    assert!(report.failed_regions.is_empty());
    assert_eq!(report.notifications_sent, 0);
    Ok(())
}

#[tokio::test]
async fn test_all_sizes_disabled() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "US", ALL_SOLD_OUT).await;
    mount_email_api(&server, 0).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::Once);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert!(report.all_sold_out());
    assert_eq!(report.unavailable.len(), 2);
    assert!(!state.alerted);
    Ok(())
}

#[tokio::test]
async fn test_slow_region_does_not_block_others() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/us/products/elle-white-dress"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SOLD_OUT_S_OPEN_SM)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "AU", SOLD_OUT_S_OPEN_SM).await;
    mount_email_api(&server, 1).await;

    let monitor = build_monitor(&server, &["US", "AU"], NotifyPolicy::EveryPass);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert_eq!(report.regions_checked, 2);
    assert_eq!(report.failed_regions, vec!["US".to_string()]);
    assert_eq!(report.available.len(), 1);
    assert_eq!(report.available[0].region, "AU");
    assert_eq!(report.notifications_sent, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_region_page_is_logged_and_skipped() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    // nothing mounted for UK, wiremock answers 404
    mount_page(&server, "AU", ALL_SOLD_OUT).await;
    mount_email_api(&server, 0).await;

    let monitor = build_monitor(&server, &["UK", "AU"], NotifyPolicy::Once);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert_eq!(report.failed_regions, vec!["UK".to_string()]);
    assert_eq!(report.unavailable.len(), 2);
    assert!(report.all_sold_out());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_storefront_is_not_reported_sold_out() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    // nothing mounted, every region answers 404
    mount_email_api(&server, 0).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::Once);
    let mut state = AlertState::default();
    let report = monitor.run_pass(&mut state).await;

    assert_eq!(report.failed_regions, vec!["US".to_string()]);
    assert!(!report.all_sold_out());
    assert!(!state.alerted);
    Ok(())
}

#[tokio::test]
async fn test_notify_once_across_passes() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "US", SOLD_OUT_S_OPEN_SM).await;
    mount_email_api(&server, 1).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::Once);
    let mut state = AlertState::default();
    let mut ticker = BoundedTicker { remaining: 2 };

    let passes = run_monitor(&monitor, &mut state, &mut ticker).await;

    assert_eq!(passes, 3);
    assert!(state.alerted);
    assert_eq!(sent_email_bodies(&server).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_every_pass_repeats_while_in_stock() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "US", SOLD_OUT_S_OPEN_SM).await;
    mount_email_api(&server, 3).await;

    let monitor = build_monitor(&server, &["US"], NotifyPolicy::EveryPass);
    let mut state = AlertState::default();
    let mut ticker = BoundedTicker { remaining: 2 };

    let passes = run_monitor(&monitor, &mut state, &mut ticker).await;

    assert_eq!(passes, 3);
    assert_eq!(sent_email_bodies(&server).await.len(), 3);
    Ok(())
}
