#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;
use todoshare::category::CategoryService;
use todoshare::config::PaginationConfig;
use todoshare::sharing::SharingService;
use todoshare::storage::Storage;
use todoshare::store::{Backend, FileStore, MemoryStore};
use todoshare::tasks::TaskService;
use todoshare::users::UserService;

/// The binary with every ambient todoshare variable cleared.
pub fn todoshare_cmd() -> Command {
    let mut cmd = Command::cargo_bin("todoshare").expect("todoshare binary");
    cmd.env_remove("TODOSHARE_HOME")
        .env_remove("TODOSHARE_USER")
        .env_remove("RUST_LOG");
    cmd
}

/// A throwaway data directory.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = todoshare_cmd();
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd
    }

    /// Run as `user` with `--json` and return the envelope's `data`.
    pub fn json_as(&self, user: &str, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--json", "--user", user])
            .args(args)
            .output()
            .expect("run todoshare");
        assert!(
            output.status.success(),
            "todoshare {args:?} failed: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        envelope["data"].clone()
    }

    pub fn add_user(&self, email: &str, name: &str) -> u64 {
        let output = self
            .cmd()
            .args(["--json", "user", "add", email, "--name", name])
            .output()
            .expect("run todoshare");
        assert!(output.status.success(), "user add {email} failed");
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        envelope["data"]["id"].as_u64().expect("user id")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        path
    }
}

/// Services over one backend, the way the binary wires them.
pub struct Services {
    pub store: Arc<dyn Backend>,
    pub users: UserService,
    pub tasks: TaskService,
    pub categories: CategoryService,
    pub sharing: SharingService,
}

impl Services {
    pub fn over(store: Arc<dyn Backend>) -> Self {
        Self::with_pagination(store, PaginationConfig::default())
    }

    pub fn with_pagination(store: Arc<dyn Backend>, pagination: PaginationConfig) -> Self {
        Self {
            users: UserService::new(store.clone()),
            tasks: TaskService::new(store.clone(), pagination),
            categories: CategoryService::new(store.clone(), pagination),
            sharing: SharingService::new(store.clone()),
            store,
        }
    }
}

pub fn memory_backend() -> Arc<dyn Backend> {
    Arc::new(MemoryStore::new())
}

/// A file store in a fresh temp dir; keep the `TempDir` alive for the test.
pub fn file_backend() -> (TempDir, Arc<dyn Backend>) {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let store = FileStore::new(Storage::new(dir.path().to_path_buf()));
    (dir, Arc::new(store))
}
