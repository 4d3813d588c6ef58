//! # Message Record
//!
//! A [`Message`] is one unit of content submitted for printing. It lives in
//! the [`QueueStore`](crate::queue::QueueStore) until it has been printed.
//!
//! ## JSON Form
//!
//! ```json
//! {
//!   "id": "4f9c…",
//!   "text": "<b>Hello</b>",
//!   "dt_received": "2024-05-01T10:00:00.250",
//!   "sender": "Alice",
//!   "cut": true
//! }
//! ```
//!
//! Keys match the field names. Absent optional fields are omitted, timestamps
//! are ISO-8601 local date-times.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Rendered in place of an absent sender or timestamp.
pub const UNKNOWN: &str = "Unknown";

/// A message waiting to be printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id. Empty until the store assigns one.
    #[serde(default)]
    pub id: String,

    /// Message body, may contain markup.
    #[serde(default)]
    pub text: String,

    /// When the client says it sent the message.
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub dt_sent: Option<NaiveDateTime>,

    /// When the server accepted the message.
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub dt_received: Option<NaiveDateTime>,

    /// When the message was rendered for printing.
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub dt_printed: Option<NaiveDateTime>,

    /// Prepared image on disk, removed together with the message.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_path: Option<PathBuf>,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub sender: Option<String>,

    /// Cut the paper after this message.
    #[serde(default = "default_cut")]
    pub cut: bool,

    /// Per-message template, honoured only when the printer allows it.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_template: Option<String>,
}

fn default_cut() -> bool {
    true
}

impl Message {
    /// A message with the given text and defaults everywhere else.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            dt_sent: None,
            dt_received: None,
            dt_printed: None,
            image_path: None,
            sender: None,
            cut: true,
            custom_template: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_received(mut self, at: NaiveDateTime) -> Self {
        self.dt_received = Some(at);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Sender name, or `"Unknown"`.
    pub fn sender_or_unknown(&self) -> &str {
        self.sender.as_deref().unwrap_or(UNKNOWN)
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(T::from))
}

/// Lenient ISO-8601 (de)serialization for optional timestamps.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Unparsable timestamps deserialize as absent rather than failing the
    /// whole record.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    /// Parse a naive ISO-8601 date-time, or an RFC 3339 one converted to
    /// local time.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.with_timezone(&Local).naive_local())
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
