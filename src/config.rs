//! # Configuration
//!
//! [`MissiveConfig`] is loaded with figment, later layers overriding earlier
//! ones:
//!
//! 1. Compiled defaults
//! 2. TOML file (`--config <path>`, or `./missive.toml` when present)
//! 3. `MISSIVE_*` environment variables (`MISSIVE_SERVER_PORT=9100`,
//!    `MISSIVE_PRINTER_IMAGE_COOLDOWN_MS=500`, ...)
//!
//! ## Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 9000
//!
//! [security]
//! valid_api_keys = ["change-me"]
//!
//! [printer]
//! device = "/dev/ttyUSB0"
//! baud = 38400
//! profile = "tm-t88iii"
//!
//! [url]
//! show_qr = true
//! reference_urls = true
//!
//! [style]
//! density = 6
//!
//! [worker]
//! template = "default"
//! schedule = { start = "08:00", end = "22:00" }
//! ```
//!
//! Unknown keys are rejected in every section.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::MissiveError;
use crate::printer::PrinterConfig;
use crate::printer::escpos::DEFAULT_QR_SIZE;
use crate::queue::QueueStore;
use crate::server::{ImageSettings, IngestState, SecurityConfig, ServerConfig};
use crate::style::Style;
use crate::template::{DEFAULT_DATETIME_FORMAT, RenderOptions};
use crate::transport::serial::{DEFAULT_BAUD, DEFAULT_DEVICE, supported_bauds};
use crate::worker::WorkerConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "missive.toml";

const ENV_PREFIX: &str = "MISSIVE_";

const SECTIONS: &[&str] = &[
    "server", "security", "storage", "printer", "image", "url", "text", "style", "worker",
    "logging",
];

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissiveConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub printer: PrinterSection,
    pub image: ImageSettings,
    pub url: UrlConfig,
    pub text: TextConfig,
    pub style: Style,
    pub worker: WorkerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Holds the queue file, its lock and prepared images.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterSection {
    pub device: String,
    pub baud: u32,
    pub always_cut: bool,
    pub image_cooldown_ms: u64,
    /// QR module size in dots (1-16).
    pub qr_size: u8,
    /// Hardware profile key, see [`PrinterConfig::by_name`].
    pub profile: String,
}

impl Default for PrinterSection {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            always_cut: false,
            image_cooldown_ms: 0,
            qr_size: DEFAULT_QR_SIZE,
            profile: "tm-t88iii".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlConfig {
    pub show_qr: bool,
    pub reference_urls: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub allow_custom_template: bool,
    pub datetime_format: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            allow_custom_template: false,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MissiveConfig {
    /// Load defaults, then `path` (or `./missive.toml`), then the environment.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, MissiveError> {
        let file = match path {
            Some(path) if !path.exists() => {
                return Err(MissiveError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(file))
                .merge(env_provider()),
        )
    }

    /// Defaults overlaid with a TOML document. No environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, MissiveError> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::string(toml)),
        )
    }

    fn extract(figment: Figment) -> Result<Self, MissiveError> {
        let config: Self = figment
            .extract()
            .map_err(|e| MissiveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), MissiveError> {
        self.printer_profile()?;
        self.image.validate()?;

        if !(1..=16).contains(&self.printer.qr_size) {
            return Err(MissiveError::Config(format!(
                "printer.qr_size must be 1-16, got {}",
                self.printer.qr_size
            )));
        }
        if !supported_bauds().contains(&self.printer.baud) {
            return Err(MissiveError::Config(format!(
                "unsupported printer.baud {} (supported: {:?})",
                self.printer.baud,
                supported_bauds()
            )));
        }
        if self.worker.poll_interval_ms == 0 {
            return Err(MissiveError::Config(
                "worker.poll_interval_ms must be positive".into(),
            ));
        }
        if self.server.read_timeout_secs == 0 {
            return Err(MissiveError::Config(
                "server.read_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn printer_profile(&self) -> Result<PrinterConfig, MissiveError> {
        PrinterConfig::by_name(&self.printer.profile)
    }

    /// Rendering behaviour for the template engine.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_qr: self.url.show_qr,
            reference_urls: self.url.reference_urls,
            allow_custom_template: self.text.allow_custom_template,
            always_cut: self.printer.always_cut,
            image_cooldown: Duration::from_millis(self.printer.image_cooldown_ms),
            base_style: self.style,
            datetime_format: self.text.datetime_format.clone(),
        }
    }

    /// State for the ingestion server, writing into `store`.
    pub fn ingest_state(&self, store: QueueStore) -> IngestState {
        IngestState {
            store,
            security: self.security.clone(),
            image: self.image.clone(),
            max_line_bytes: self.server.max_line_bytes,
            read_timeout: self.server.read_timeout(),
        }
    }
}

/// `MISSIVE_<SECTION>_<KEY>` → `<section>.<key>`.
///
/// Sections are matched explicitly since keys contain underscores
/// (`MISSIVE_PRINTER_IMAGE_COOLDOWN_MS` → `printer.image_cooldown_ms`).
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| section_key(key.as_str()).into())
}

fn section_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{}.{}", section, rest))
        })
        .unwrap_or_else(|| key.to_string())
}

// ============================================================================
// TESTS
// ============================================================================
