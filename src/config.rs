//! Configuration types for trade-tape

use crate::feed::{SubscriptionSet, HYPERLIQUID_WS_URL};
use crate::sink::DEFAULT_CAPACITY;
use crate::telemetry::LogFormat;
use crate::ws::WsConfig;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Coins to subscribe to, in subscription order
    #[serde(default = "default_coins")]
    pub coins: Vec<String>,

    /// Fixed delay between a fault and the next attempt (seconds)
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Keep-alive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Time allowed for a pong after a ping (seconds)
    #[serde(default = "default_pong_timeout_secs")]
    pub pong_timeout_secs: u64,

    /// Closing handshake timeout (seconds)
    #[serde(default = "default_close_timeout_secs")]
    pub close_timeout_secs: u64,

    /// Opening handshake timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_url() -> String {
    HYPERLIQUID_WS_URL.to_string()
}
fn default_coins() -> Vec<String> {
    vec!["BTC".to_string(), "ETH".to_string()]
}
fn default_reconnect_delay_secs() -> u64 {
    5
}
fn default_ping_interval_secs() -> u64 {
    20
}
fn default_pong_timeout_secs() -> u64 {
    20
}
fn default_close_timeout_secs() -> u64 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            coins: default_coins(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            pong_timeout_secs: default_pong_timeout_secs(),
            close_timeout_secs: default_close_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl FeedConfig {
    pub fn subscriptions(&self) -> SubscriptionSet {
        SubscriptionSet::new(self.coins.iter().cloned())
    }

    pub fn ws_config(&self) -> WsConfig {
        WsConfig::new(self.url.clone())
            .reconnect_delay(Duration::from_secs(self.reconnect_delay_secs))
            .ping_interval(Duration::from_secs(self.ping_interval_secs))
            .pong_timeout(Duration::from_secs(self.pong_timeout_secs))
            .close_timeout(Duration::from_secs(self.close_timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

/// Viewer fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Records a viewer may fall behind before it starts skipping
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let feed = &self.feed;
        anyhow::ensure!(!feed.url.trim().is_empty(), "feed.url must not be empty");
        anyhow::ensure!(
            !feed.coins.iter().all(|c| c.trim().is_empty()),
            "feed.coins must name at least one coin"
        );
        anyhow::ensure!(
            feed.coins.iter().all(|c| !c.trim().is_empty()),
            "feed.coins must not contain empty symbols"
        );
        for (name, secs) in [
            ("reconnect_delay_secs", feed.reconnect_delay_secs),
            ("ping_interval_secs", feed.ping_interval_secs),
            ("pong_timeout_secs", feed.pong_timeout_secs),
            ("close_timeout_secs", feed.close_timeout_secs),
            ("connect_timeout_secs", feed.connect_timeout_secs),
        ] {
            anyhow::ensure!(secs > 0, "feed.{} must be positive", name);
        }
        anyhow::ensure!(self.broadcast.capacity > 0, "broadcast.capacity must be positive");
        Ok(())
    }
}
