//! Application configuration and environment variable parsing.
//!
//! This module handles loading configuration settings from the environment (e.g., .env file).
//! It defines the `AppConfig` struct which governs the metrics port, the refresh
//! cadence of the background fetch loop, and the GitHub credential.

use serde::Deserialize;
use std::time::Duration as StdDuration;

/// Owner of the repository whose pull requests are exported.
///
/// Owner and repository are compile-time constants rather than runtime
/// configuration; this exporter watches exactly one repository.
pub const REPO_OWNER: &str = "gitpod-io";

/// Name of the repository whose pull requests are exported.
pub const REPO_NAME: &str = "gitpod";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token used for the GraphQL API.
    /// Required; the process refuses to start without it.
    pub github_token: String,

    /// Port the metrics endpoint listens on.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Seconds between two refresh cycles of the pull request gauges.
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
}

fn default_metrics_port() -> u16 {
    9500
}

fn default_refresh_interval_seconds() -> u64 {
    600
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn refresh_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.refresh_interval_seconds)
    }
}
