//! # Processing Loop
//!
//! A single sequential loop that owns the printer:
//!
//! ```text
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                                                          │
//!     ▼                                                          │
//! enabled? ─no─► sleep ──────────────────────────────────────────┤
//!     │yes                                                       │
//! in schedule? ─no─► sleep ──────────────────────────────────────┤
//!     │yes                                                       │
//! oldest() ─none─► sleep ────────────────────────────────────────┤
//!     │                                                          │
//! build actions ──► replay on sink ──► delete ──► sleep ─────────┘
//! ```
//!
//! A message is deleted only after every action succeeded. A failure
//! leaves it queued and the next pass tries again. A crash between the
//! last action and the delete prints it twice.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::action::replay;
use crate::error::MissiveError;
use crate::queue::QueueStore;
use crate::sink::PrinterSink;
use crate::template::{RenderOptions, message_actions};

const SHUTDOWN_CHECK: Duration = Duration::from_millis(100);

/// Processing loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    /// Name of the template every message is printed with.
    pub template: String,
    /// Extra `*.tmpl` files, overriding built-ins of the same name.
    pub template_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub schedule: Option<Schedule>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            template: "default".to_string(),
            template_dir: None,
            poll_interval_ms: 2500,
            schedule: None,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Daily window, in local time, during which messages are printed.
///
/// `start > end` wraps midnight (`22:00`–`06:00`). `start == end` is
/// always open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Schedule {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start == self.end {
            true
        } else if self.start < self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

/// `HH:MM` times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(|e| {
            de::Error::custom(format!("invalid time '{}' (expected HH:MM): {}", raw, e))
        })
    }
}

/// Prints queued messages one at a time.
pub struct Worker<S: PrinterSink> {
    store: QueueStore,
    sink: S,
    template: String,
    options: RenderOptions,
    schedule: Option<Schedule>,
}

impl<S: PrinterSink> Worker<S> {
    pub fn new(
        store: QueueStore,
        sink: S,
        template: impl Into<String>,
        options: RenderOptions,
    ) -> Self {
        Self {
            store,
            sink,
            template: template.into(),
            options,
            schedule: None,
        }
    }

    pub fn with_schedule(mut self, schedule: Option<Schedule>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Print and delete the oldest message, if processing is enabled and the
    /// current time is inside the schedule. Returns the printed id.
    pub fn process_next(&mut self) -> Result<Option<String>, MissiveError> {
        self.process_next_at(Local::now().time())
    }

    /// [`Worker::process_next`] with an explicit time of day.
    pub fn process_next_at(&mut self, now: NaiveTime) -> Result<Option<String>, MissiveError> {
        if !self.store.processing_enabled()? {
            debug!("processing paused");
            return Ok(None);
        }
        if let Some(schedule) = &self.schedule {
            if !schedule.contains(now) {
                debug!(time = %now.format("%H:%M"), "outside print schedule");
                return Ok(None);
            }
        }

        let Some(mut message) = self.store.oldest()? else {
            return Ok(None);
        };

        info!(id = %message.id, sender = %message.sender_or_unknown(), "printing message");
        let actions = message_actions(&mut message, &self.template, &self.options);
        replay(&actions, &mut self.sink)?;

        self.store.delete(&message.id)?;
        info!(id = %message.id, actions = actions.len(), "message printed");
        Ok(Some(message.id))
    }

    /// Loop until `shutdown` is set, pausing `poll_interval` between passes.
    pub fn run(&mut self, shutdown: &AtomicBool, poll_interval: Duration) {
        info!(poll_ms = poll_interval.as_millis() as u64, "processing loop started");

        while !shutdown.load(Ordering::Relaxed) {
            if let Err(e) = self.process_next() {
                error!(error = %e, "processing failed, retrying next pass");
            }

            let deadline = Instant::now() + poll_interval;
            while !shutdown.load(Ordering::Relaxed) {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    break;
                }
                thread::sleep(left.min(SHUTDOWN_CHECK));
            }
        }

        info!("processing loop stopped");
    }
}

// ============================================================================
// TESTS
// ============================================================================
