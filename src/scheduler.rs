use async_trait::async_trait;
use std::time::Duration;

use crate::monitor::{AlertState, StockMonitor};

/// Paces the polling loop between passes.
#[async_trait]
pub trait Ticker: Send {
    /// Waits until the next pass is due. Returning `false` ends the loop.
    async fn tick(&mut self) -> bool;
}

/// Fixed sleep between passes, forever.
pub struct IntervalTicker {
    interval: Duration,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        let next = chrono::Duration::from_std(self.interval)
            .ok()
            .map(|d| chrono::Local::now() + d);

        match next {
            Some(at) => tracing::info!(
                "⏰ Next check in {} minutes (at {})...",
                self.interval.as_secs() / 60,
                at.format("%H:%M:%S")
            ),
            None => tracing::info!("⏰ Next check in {} minutes...", self.interval.as_secs() / 60),
        }

        tokio::time::sleep(self.interval).await;
        true
    }
}

/// Runs passes until the ticker says stop. Returns the number of passes run.
pub async fn run_monitor(
    monitor: &StockMonitor,
    state: &mut AlertState,
    ticker: &mut dyn Ticker,
) -> u64 {
    let mut passes = 0;
    loop {
        let report = monitor.run_pass(state).await;
        passes += 1;
        tracing::debug!(
            "Pass {} finished in {}ms: {} available, {} failed regions, {} emails sent",
            passes,
            report.elapsed_ms,
            report.available.len(),
            report.failed_regions.len(),
            report.notifications_sent
        );

        if !ticker.tick().await {
            return passes;
        }
    }
}
