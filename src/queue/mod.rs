//! # Queue Store
//!
//! Messages waiting to be printed, persisted as one JSON document inside the
//! data directory:
//!
//! ```text
//! data/
//! ├── queue.json      {"processing_enabled": true, "messages": {"<id>": {...}}}
//! ├── queue.lock      advisory lock, held for the duration of one call
//! └── img/tmp/        prepared images, one per message
//! ```
//!
//! Every public operation takes the lock, reads the document, optionally
//! writes it back (temp file + rename) and releases the lock. Nothing is
//! held between calls, so a caller that reads and then deletes may act on a
//! stale view. The processing loop is the only deleter.
//!
//! ## Ordering
//!
//! [`QueueStore::oldest`] picks the smallest `dt_received`. Records without
//! one are only considered when no record has one. Ties go to the smallest
//! id, since records are kept sorted by id.

mod lock;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MissiveError;
use crate::message::Message;

pub use lock::FileLock;

const QUEUE_FILE: &str = "queue.json";
const LOCK_FILE: &str = "queue.lock";
const IMAGE_DIR: &str = "img/tmp";

/// On-disk document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct QueueState {
    processing_enabled: bool,
    messages: BTreeMap<String, Message>,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            processing_enabled: true,
            messages: BTreeMap::new(),
        }
    }
}

/// File-backed message queue.
#[derive(Debug, Clone)]
pub struct QueueStore {
    data_dir: PathBuf,
}

impl QueueStore {
    /// Open (creating if needed) the store rooted at `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, MissiveError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(data_dir.join(IMAGE_DIR)).map_err(|e| {
            MissiveError::Store(format!("cannot create {}: {}", data_dir.display(), e))
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where prepared images for queued messages are written.
    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(IMAGE_DIR)
    }

    fn queue_path(&self) -> PathBuf {
        self.data_dir.join(QUEUE_FILE)
    }

    /// Store `message`, assigning a fresh id if it has none. Returns the id.
    ///
    /// An existing record with the same id is replaced.
    pub fn insert(&self, mut message: Message) -> Result<String, MissiveError> {
        if message.id.is_empty() {
            message.id = Uuid::new_v4().to_string();
        }
        let id = message.id.clone();
        self.update(|state| {
            state.messages.insert(id.clone(), message);
        })?;
        debug!(id = %id, "message stored");
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Result<Option<Message>, MissiveError> {
        self.read(|state| state.messages.get(id).cloned())
    }

    /// Remove a record and its image. Returns whether a record was removed.
    ///
    /// Image removal problems are logged and never fail the call.
    pub fn delete(&self, id: &str) -> Result<bool, MissiveError> {
        let removed = self.update(|state| state.messages.remove(id))?;
        let Some(message) = removed else {
            return Ok(false);
        };
        if let Some(path) = &message.image_path {
            remove_image(path);
        }
        debug!(id = %id, "message deleted");
        Ok(true)
    }

    /// Every record, sorted by id.
    pub fn all(&self) -> Result<Vec<Message>, MissiveError> {
        self.read(|state| state.messages.values().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, MissiveError> {
        self.read(|state| state.messages.len())
    }

    pub fn is_empty(&self) -> Result<bool, MissiveError> {
        Ok(self.len()? == 0)
    }

    /// The next message to print, see the module docs for the ordering.
    pub fn oldest(&self) -> Result<Option<Message>, MissiveError> {
        self.read(|state| {
            let timestamped = state
                .messages
                .values()
                .filter(|m| m.dt_received.is_some())
                .min_by_key(|m| m.dt_received);
            timestamped
                .or_else(|| state.messages.values().next())
                .cloned()
        })
    }

    /// Drop every record. Images are left in place.
    pub fn truncate(&self) -> Result<(), MissiveError> {
        self.update(|state| state.messages.clear())
    }

    pub fn set_processing_enabled(&self, enabled: bool) -> Result<(), MissiveError> {
        self.update(|state| state.processing_enabled = enabled)
    }

    pub fn processing_enabled(&self) -> Result<bool, MissiveError> {
        self.read(|state| state.processing_enabled)
    }

    // ========================================================================
    // Locked document access
    // ========================================================================

    fn read<T>(&self, f: impl FnOnce(&QueueState) -> T) -> Result<T, MissiveError> {
        let _lock = FileLock::acquire(&self.data_dir.join(LOCK_FILE))?;
        let state = self.load()?;
        Ok(f(&state))
    }

    fn update<T>(&self, f: impl FnOnce(&mut QueueState) -> T) -> Result<T, MissiveError> {
        let _lock = FileLock::acquire(&self.data_dir.join(LOCK_FILE))?;
        let mut state = self.load()?;
        let result = f(&mut state);
        self.save(&state)?;
        Ok(result)
    }

    fn load(&self) -> Result<QueueState, MissiveError> {
        let path = self.queue_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(QueueState::default()),
            Err(e) => {
                return Err(MissiveError::Store(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(QueueState::default());
        }

        let mut state: QueueState = serde_json::from_slice(&bytes).map_err(|e| {
            MissiveError::Store(format!("corrupt queue file {}: {}", path.display(), e))
        })?;
        for (id, message) in state.messages.iter_mut() {
            if message.id.is_empty() {
                message.id = id.clone();
            }
        }
        Ok(state)
    }

    fn save(&self, state: &QueueState) -> Result<(), MissiveError> {
        let path = self.queue_path();
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state)?;
        write_synced(&tmp, &bytes)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| MissiveError::Store(format!("cannot write {}: {}", path.display(), e)))
    }
}

/// Data must reach the disk before the rename publishes it.
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn remove_image(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "image removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "image already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "could not delete image file"),
    }
}

// ============================================================================
// TESTS
// ============================================================================
