//! Configuration schema for rotest-board
//!
//! Configuration is stored at `~/.config/rotest-board/config.toml`

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Push feed connection
    pub feed: FeedConfig,

    /// Resource control API
    pub control: ControlConfig,

    /// Dashboard rendering
    pub view: ViewConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record lock/release calls in the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Push feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Host running the rotest push feed
    pub host: String,

    /// Push feed port
    pub port: u16,

    /// Parsed envelopes buffered between the connection and the store
    pub channel_capacity: usize,

    /// Reconnect behaviour after the connection drops
    pub reconnect: ReconnectConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9000,
            channel_capacity: 256,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl FeedConfig {
    /// WebSocket URL of the feed, `ws://<host>:<port>`
    pub fn url(&self) -> BoardResult<Url> {
        let host = self.host.trim();
        let address = format!("{}:{}", host, self.port);

        if host.is_empty() {
            return Err(BoardError::FeedAddress {
                address,
                reason: "host is empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(BoardError::FeedAddress {
                address,
                reason: "port must be 1-65535".to_string(),
            });
        }

        // Bare IPv6 literals need brackets inside a URL
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        let url = Url::parse(&format!("ws://{}:{}", host, self.port)).map_err(|e| {
            BoardError::FeedAddress {
                address: address.clone(),
                reason: e.to_string(),
            }
        })?;

        if url.path() != "/" || url.query().is_some() || url.username() != "" {
            return Err(BoardError::FeedAddress {
                address,
                reason: "host must be a plain hostname or IP address".to_string(),
            });
        }

        Ok(url)
    }
}

/// Exponential backoff settings for feed reconnects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub initial_delay_ms: u64,

    /// Upper bound on the delay between attempts
    pub max_delay_ms: u64,

    /// Growth factor applied after each failed attempt
    pub multiplier: f64,

    /// Give up after this many consecutive failures (unset = never)
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            max_attempts: None,
        }
    }
}

/// Resource control API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Base URL of the rotest web server
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ControlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Which card layout to render records with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Plain data card
    Data,
    /// Data card plus user field and lock indicator
    Resource,
}

/// Dashboard rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Entity type shown by default
    pub type_name: String,

    /// Extra fields to hide, on top of "group"
    pub field_filter: Vec<String>,

    /// Card layout
    pub card: CardKind,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            type_name: "TestClassData".to_string(),
            field_filter: vec![],
            card: CardKind::Resource,
        }
    }
}
