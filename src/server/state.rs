//! Server configuration and the state shared by connection tasks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::image::ImageSettings;
use crate::queue::QueueStore;

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1")
    pub host: String,
    pub port: u16,
    /// Longest submission line accepted, newline included.
    pub max_line_bytes: usize,
    /// How long a client may take to send its line.
    pub read_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            max_line_bytes: 16 * 1024 * 1024,
            read_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Who may submit messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    pub allow_unauthenticated: bool,
    pub valid_api_keys: Vec<String>,
}

impl SecurityConfig {
    pub fn is_authorized(&self, api_key: Option<&str>) -> bool {
        self.allow_unauthenticated
            || api_key.is_some_and(|key| self.valid_api_keys.iter().any(|valid| valid == key))
    }
}

/// State shared across connection tasks.
#[derive(Debug, Clone)]
pub struct IngestState {
    pub store: QueueStore,
    pub security: SecurityConfig,
    pub image: ImageSettings,
    pub max_line_bytes: usize,
    pub read_timeout: Duration,
}
