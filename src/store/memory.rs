//! Process-local store guarded by a mutex.

use std::sync::{Mutex, MutexGuard};

use crate::context::OpContext;
use crate::error::Result;

use super::{impl_backend_via_database, Database};

/// Keeps everything in memory. Each call holds the mutex for its whole closure, so
/// uniqueness checks and inserts are atomic with respect to other callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Database>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            state: Mutex::new(db),
        }
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> Database {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        // Database methods validate before mutating, so poisoned state is still consistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T>(
        &self,
        ctx: &OpContext,
        operation: &'static str,
        f: impl FnOnce(&Database) -> Result<T>,
    ) -> Result<T> {
        ctx.check(operation)?;
        let db = self.lock();
        f(&db)
    }

    fn write<T>(
        &self,
        ctx: &OpContext,
        operation: &'static str,
        f: impl FnOnce(&mut Database) -> Result<T>,
    ) -> Result<T> {
        ctx.check(operation)?;
        let mut db = self.lock();
        ctx.check(operation)?;
        f(&mut db)
    }
}

impl_backend_via_database!(MemoryStore);
