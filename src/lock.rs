//! Cross-process locking for the data directory and crash-safe file replacement.
//!
//! Writers hold [`StoreLock`] on `store.lock` for a whole load/modify/save cycle; the file
//! itself is replaced with [`write_atomic`] so readers never observe half a document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Poll for the exclusive lock on `path` for at most `wait_ms`, creating the file if needed.
    pub fn acquire(path: impl AsRef<Path>, wait_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        let give_up_at = Instant::now() + Duration::from_millis(wait_ms);
        loop {
            let err = match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(err) => err,
            };
            if !is_contended(&err) {
                return Err(Error::Io(err));
            }

            let now = Instant::now();
            if now >= give_up_at {
                tracing::warn!(path = %path.display(), wait_ms, "store lock still held");
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            thread::sleep(POLL_INTERVAL.min(give_up_at - now));
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Replace `path` with `data` via a uniquely named sibling and a rename.
///
/// Takes no lock; concurrent callers each get their own temp file and the last rename wins.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let temp = temp_sibling(path);
    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|()| fs::rename(&temp, path)) {
        let _ = fs::remove_file(&temp);
        return Err(Error::Io(err));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}
