use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::{RegionTarget, TargetsConfig, DEFAULT_ALERT_SUBJECT};
use crate::plugins::trackers::Availability;
use crate::plugins::traits::{Notifier, PageSource, StockAlert};

/// Whether a size that stays in stock keeps producing emails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyPolicy {
    /// One email for the lifetime of the process, then silence.
    Once,
    /// An email for every available size/region on every pass.
    EveryPass,
}

impl fmt::Display for NotifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyPolicy::Once => f.write_str("once"),
            NotifyPolicy::EveryPass => f.write_str("every-pass"),
        }
    }
}

/// Alert latch carried between passes. Lives for the process only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub alerted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHit {
    pub region: String,
    pub size: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassReport {
    pub regions_checked: usize,
    pub failed_regions: Vec<String>,
    pub available: Vec<SizeHit>,
    pub unavailable: Vec<SizeHit>,
    pub notifications_sent: usize,
    pub notification_failures: usize,
    pub elapsed_ms: u64,
}

impl PassReport {
    /// True only when at least one region was read and none had a size open.
    pub fn all_sold_out(&self) -> bool {
        self.available.is_empty() && self.failed_regions.len() < self.regions_checked
    }
}

pub struct StockMonitor {
    source: Box<dyn PageSource>,
    notifier: Box<dyn Notifier>,
    targets: TargetsConfig,
    policy: NotifyPolicy,
    subject: String,
}

impl StockMonitor {
    pub fn new(
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        targets: TargetsConfig,
        policy: NotifyPolicy,
    ) -> Self {
        Self {
            source,
            notifier,
            targets,
            policy,
            subject: DEFAULT_ALERT_SUBJECT.to_string(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// Checks every region and size once, in configured order.
    ///
    /// Region fetch failures and delivery failures are logged and folded into
    /// the report; they never abort the pass. Under [`NotifyPolicy::Once`] the
    /// pass ends at the first available size.
    pub async fn run_pass(&self, state: &mut AlertState) -> PassReport {
        let start_time = Instant::now();
        let mut report = PassReport::default();

        info!("🔍 Checking stock...");

        'regions: for region in &self.targets.regions {
            report.regions_checked += 1;

            let statuses = match self.source.probe(&region.url, &self.targets.sizes).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    error!("❌ Error checking stock in {} ({}): {}", region.label, region.url, e);
                    report.failed_regions.push(region.label.clone());
                    continue;
                }
            };

            for status in statuses {
                let hit = SizeHit {
                    region: region.label.clone(),
                    size: status.size,
                    url: region.url.clone(),
                };

                match status.availability {
                    Availability::Available => {
                        info!("✅ Found {} IN STOCK in {}!", hit.size, hit.region);
                        let stop = self.handle_available(&hit, state, &mut report).await;
                        report.available.push(hit);
                        if stop {
                            break 'regions;
                        }
                    }
                    Availability::Unavailable => {
                        info!("  {} ({}): Unavailable", hit.size, hit.region);
                        report.unavailable.push(hit);
                    }
                    Availability::NotFound => {
                        debug!("  {} ({}): no size selector on page", hit.size, hit.region);
                    }
                }
            }
        }

        if report.all_sold_out() {
            info!("❌ All target sizes still sold out");
        }

        report.elapsed_ms = start_time.elapsed().as_millis() as u64;
        report
    }

    /// Returns true when the pass should stop here.
    async fn handle_available(
        &self,
        hit: &SizeHit,
        state: &mut AlertState,
        report: &mut PassReport,
    ) -> bool {
        match self.policy {
            NotifyPolicy::Once => {
                if state.alerted {
                    info!("ℹ️  Alert already sent this session, not emailing again");
                } else if self.send_alert(hit, report).await {
                    state.alerted = true;
                }
                true
            }
            NotifyPolicy::EveryPass => {
                self.send_alert(hit, report).await;
                false
            }
        }
    }

    async fn send_alert(&self, hit: &SizeHit, report: &mut PassReport) -> bool {
        let alert = StockAlert::new(
            self.subject.as_str(),
            hit.size.as_str(),
            hit.region.as_str(),
            hit.url.as_str(),
        );

        match self.notifier.notify(&alert).await {
            Ok(receipt) => {
                info!(
                    "📧 Email sent via {} for {} ({})",
                    receipt.transport, hit.size, hit.region
                );
                report.notifications_sent += 1;
                true
            }
            Err(e) => {
                error!(
                    "❌ Failed to send alert for {} ({}) via {}: {}",
                    hit.size,
                    hit.region,
                    self.notifier.transport(),
                    e
                );
                report.notification_failures += 1;
                false
            }
        }
    }

    pub fn regions(&self) -> &[RegionTarget] {
        &self.targets.regions
    }
}
