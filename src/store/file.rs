//! JSON file store shared between processes.
//!
//! Every call takes the exclusive `store.lock`, loads `store.json`, runs the closure and, for
//! writes that succeed, replaces the file atomically before the lock is released. Lock waits
//! are bounded by both the configured lock timeout and the caller's deadline.

use std::time::Duration;

use crate::context::OpContext;
use crate::error::{Error, Result};
use crate::lock::{StoreLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::storage::Storage;

use super::{impl_backend_via_database, Database};

#[derive(Debug, Clone)]
pub struct FileStore {
    storage: Storage,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = lock_timeout_ms;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn acquire(&self, ctx: &OpContext, operation: &'static str) -> Result<StoreLock> {
        let mut timeout_ms = self.lock_timeout_ms;
        if let Some(remaining) = ctx.remaining() {
            timeout_ms = timeout_ms.min(duration_ms(remaining));
        }

        match StoreLock::acquire(self.storage.store_lock_file(), timeout_ms) {
            Err(Error::LockFailed(_)) if ctx.is_done() => Err(Error::Timeout {
                operation: operation.to_string(),
            }),
            other => other,
        }
    }

    fn load(&self) -> Result<Database> {
        let db = self
            .storage
            .read_json::<Database>(&self.storage.store_file())?
            .unwrap_or_default();
        Ok(db)
    }

    fn read<T>(
        &self,
        ctx: &OpContext,
        operation: &'static str,
        f: impl FnOnce(&Database) -> Result<T>,
    ) -> Result<T> {
        ctx.check(operation)?;
        let _lock = self.acquire(ctx, operation)?;
        let db = self.load()?;
        f(&db)
    }

    fn write<T>(
        &self,
        ctx: &OpContext,
        operation: &'static str,
        f: impl FnOnce(&mut Database) -> Result<T>,
    ) -> Result<T> {
        ctx.check(operation)?;
        self.storage.init()?;
        let _lock = self.acquire(ctx, operation)?;
        let mut db = self.load()?;
        let value = f(&mut db)?;

        ctx.check(operation)?;
        self.storage.write_json(&self.storage.store_file(), &db)?;
        tracing::debug!(operation, path = %self.storage.store_file().display(), "store committed");
        Ok(value)
    }
}

/// Whole milliseconds, rounded up so the lock wait never ends before the deadline.
fn duration_ms(duration: Duration) -> u64 {
    let millis = duration.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl_backend_via_database!(FileStore);
