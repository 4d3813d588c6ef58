//! Advisory file lock guarding the queue file.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::error::MissiveError;

/// Exclusive `flock(2)` on a lock file, released on drop.
///
/// Every acquisition opens its own file description, so two guards block
/// each other within one process as well as across processes.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the exclusive lock on `path` is held.
    pub fn acquire(path: &Path) -> Result<Self, MissiveError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| MissiveError::Store(format!("cannot open {}: {}", path.display(), e)))?;

        loop {
            // SAFETY: flock only reads the descriptor, which `file` keeps open.
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
            if rc == 0 {
                return Ok(Self { file });
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(MissiveError::Store(format!(
                    "cannot lock {}: {}",
                    path.display(),
                    err
                )));
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // SAFETY: see `acquire`.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_lock_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.lock");
        let _guard = FileLock::acquire(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_lock_is_exclusive_between_threads() {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("q.lock"));
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (path, inside, peak) = (path.clone(), inside.clone(), peak.clone());
                thread::spawn(move || {
                    for _ in 0..5 {
                        let _guard = FileLock::acquire(&path).unwrap();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(1));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unopenable_lock_is_store_error() {
        let err = FileLock::acquire(Path::new("/definitely/not/here/q.lock")).unwrap_err();
        assert!(matches!(err, MissiveError::Store(_)));
    }
}
