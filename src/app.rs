//! Wiring of storage, configuration and services for one invocation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::actor;
use crate::category::CategoryService;
use crate::config::Config;
use crate::context::OpContext;
use crate::error::Result;
use crate::model::User;
use crate::sharing::SharingService;
use crate::storage::Storage;
use crate::store::{Backend, FileStore};
use crate::tasks::TaskService;
use crate::users::UserService;

pub struct App {
    storage: Storage,
    config: Config,
    users: UserService,
    tasks: TaskService,
    categories: CategoryService,
    sharing: SharingService,
}

impl App {
    /// Open the data directory (explicit path or platform default) backed by the file store.
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let storage = Storage::resolve(data_dir)?;
        let config = Config::load_from_dir(storage.data_dir())?;
        let store =
            FileStore::new(storage.clone()).with_lock_timeout(config.store.lock_timeout_ms);
        tracing::debug!(data_dir = %storage.data_dir().display(), "opened data directory");
        Ok(Self::with_backend(storage, config, Arc::new(store)))
    }

    pub fn with_backend(storage: Storage, config: Config, store: Arc<dyn Backend>) -> Self {
        Self {
            users: UserService::new(store.clone()),
            tasks: TaskService::new(store.clone(), config.pagination),
            categories: CategoryService::new(store.clone(), config.pagination),
            sharing: SharingService::new(store),
            storage,
            config,
        }
    }

    /// A fresh context bounded by `[operations] timeout_ms`.
    pub fn context(&self) -> OpContext {
        OpContext::with_timeout(self.config.operations.timeout())
    }

    /// Resolve and look up the acting user.
    pub fn acting_user(&self, ctx: &OpContext, cli_user: Option<&str>) -> Result<User> {
        let reference = actor::resolve_actor(&self.storage, &self.config, cli_user)?;
        self.users.lookup(ctx, &reference)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn sharing(&self) -> &SharingService {
        &self.sharing
    }
}
