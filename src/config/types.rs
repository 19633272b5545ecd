//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and precedence live in
//! `config::mod`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, DEFAULT_WAIT_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_SECS,
};

/// How final command output is written to stdout.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub execution: ExecutionConfig,
}

/// API connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.into(),
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    pub output: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            output: OutputFormat::Human,
        }
    }
}

/// Settings for "wait for target state" polling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub wait_interval_ms: u64,
    pub wait_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            wait_interval_ms: DEFAULT_WAIT_INTERVAL_MS,
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
        }
    }
}

impl ExecutionConfig {
    pub fn wait_interval(&self) -> Duration {
        Duration::from_millis(self.wait_interval_ms.max(1))
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs.max(1))
    }
}
