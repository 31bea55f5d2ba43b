//! Background refresh of the pull request gauges.
//!
//! One spawned task runs fetch → classify → publish on a fixed cadence,
//! strictly sequentially within each cycle. A failed fetch skips the rest
//! of the cycle and leaves the previously published values in place.

use crate::classifier;
use crate::config::{AppConfig, REPO_NAME, REPO_OWNER};
use crate::github::GitHubClient;
use crate::metrics::{self, MetricsSink};
use crate::printer;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

pub struct Refresher {
    client: GitHubClient,
    sink: Arc<MetricsSink>,
    config: AppConfig,
}

impl Refresher {
    pub fn new(client: GitHubClient, sink: Arc<MetricsSink>, config: AppConfig) -> Self {
        Self {
            client,
            sink,
            config,
        }
    }

    /// Spawns the refresh loop. The first fetch starts immediately; every
    /// later one waits for the timer. The task never terminates on fetch
    /// failure.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        tracing::info!(
            owner = REPO_OWNER,
            repo = REPO_NAME,
            interval_seconds = self.config.refresh_interval_seconds,
            "starting pull request refresh loop"
        );

        let mut interval = tokio::time::interval(self.config.refresh_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.refresh_once().await {
                // Previous gauge values stay published; retry on the next tick.
                tracing::error!("cannot download pull requests: {:#}", e);
            }
        }
    }

    async fn refresh_once(&self) -> Result<()> {
        let prs = self
            .client
            .fetch_open_pull_requests(REPO_OWNER, REPO_NAME)
            .await?;

        let report = classifier::classify(&prs, Utc::now());
        metrics::publish(&self.sink, &report);

        tracing::info!(
            open = report.open.len(),
            draft = report.draft.len(),
            approved = report.approved.len(),
            commented = report.commented.len(),
            overdue = report.overdue_review.len(),
            "refreshed pull request gauges"
        );
        tracing::debug!("wip report:\n{}", printer::render_report(&report));

        Ok(())
    }
}
