//! Submission handling: one JSON line in, one status line out.
//!
//! ```text
//! client ── {"api_key":"…","sender":"Alice","text":"<b>hi</b>"}\n ──► server
//! client ◄──────────────── Message stored.\n ───────────────────────── server
//! ```
//!
//! | Reply | When |
//! |-------|------|
//! | `Message stored.` | the message is queued |
//! | `Unauthorized.` | the API key is missing or not listed |
//! | `Error: <description>` | bad JSON, bad image, store failure |

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::image::save_submission_image;
use super::state::IngestState;
use crate::error::MissiveError;
use crate::message::{Message, timestamp};

pub const STORED_REPLY: &str = "Message stored.";
pub const UNAUTHORIZED_REPLY: &str = "Unauthorized.";

const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// What a client sends. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub dt_sent: Option<NaiveDateTime>,

    /// Base64-encoded image file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Stored(String),
    Unauthorized,
    Error(String),
}

impl Reply {
    /// The status line sent back, newline included.
    pub fn line(&self) -> String {
        match self {
            Reply::Stored(_) => format!("{}\n", STORED_REPLY),
            Reply::Unauthorized => format!("{}\n", UNAUTHORIZED_REPLY),
            Reply::Error(description) => format!("Error: {}\n", description),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Handle one submission line. Blocking: touches the disk.
pub fn handle_line(line: &str, state: &IngestState) -> Reply {
    let submission: Submission = match serde_json::from_str(line) {
        Ok(submission) => submission,
        Err(e) => return Reply::Error(e.to_string()),
    };

    if !state.security.is_authorized(submission.api_key.as_deref()) {
        return Reply::Unauthorized;
    }

    match store_submission(submission, state) {
        Ok(id) => Reply::Stored(id),
        Err(e) => Reply::Error(e.to_string()),
    }
}

fn store_submission(submission: Submission, state: &IngestState) -> Result<String, MissiveError> {
    let id = Uuid::new_v4().to_string();

    let mut message = Message::new(submission.text.unwrap_or_default()).with_id(id.clone());
    message.sender = non_empty(submission.sender);
    message.dt_sent = submission.dt_sent;
    message.dt_received = Some(Local::now().naive_local());
    message.cut = submission.cut.unwrap_or(true);
    message.custom_template = non_empty(submission.custom_template);

    if let Some(encoded) = non_empty(submission.image) {
        let path = save_submission_image(&encoded, &id, &state.store.image_dir(), &state.image)?;
        message.image_path = Some(path);
    }

    let image_path = message.image_path.clone();
    state.store.insert(message).inspect_err(|_| {
        if let Some(path) = image_path {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "cannot remove orphaned image");
            }
        }
    })
}

/// Read one line from `stream`, handle it and write the reply.
pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, state: Arc<IngestState>) {
    let (reader, mut writer) = stream.into_split();
    let limit = state.max_line_bytes;
    let mut reader = BufReader::new(reader).take(limit as u64);

    let mut buf = Vec::new();
    let read = timeout(state.read_timeout, reader.read_until(b'\n', &mut buf)).await;
    let reply = match read {
        Err(_) => Reply::Error("read timed out".to_string()),
        Ok(Err(e)) => Reply::Error(format!("read failed: {}", e)),
        Ok(Ok(_)) if buf.len() >= limit && !buf.ends_with(b"\n") => {
            Reply::Error(format!("submission exceeds {} bytes", limit))
        }
        Ok(Ok(_)) => match String::from_utf8(buf) {
            Err(_) => Reply::Error("submission is not valid UTF-8".to_string()),
            Ok(line) => {
                let state = Arc::clone(&state);
                tokio::task::spawn_blocking(move || handle_line(line.trim_end(), &state))
                    .await
                    .unwrap_or_else(|e| Reply::Error(format!("handler failed: {}", e)))
            }
        },
    };

    match &reply {
        Reply::Stored(id) => info!(peer = %peer, id = %id, "message stored"),
        Reply::Unauthorized => warn!(peer = %peer, "unauthorized submission"),
        Reply::Error(description) => {
            warn!(peer = %peer, error = %description, "submission rejected")
        }
    }

    if let Err(e) = writer.write_all(reply.line().as_bytes()).await {
        debug!(peer = %peer, error = %e, "cannot send reply");
        return;
    }
    let _ = writer.shutdown().await;

    // Unread input would turn the close into a reset and lose the reply.
    let mut rest = reader.into_inner();
    let _ = timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await;
}

// ============================================================================
// TESTS
// ============================================================================
