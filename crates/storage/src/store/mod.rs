#![forbid(unsafe_code)]

mod branches;
mod checkpoints;
mod conversation;
mod error;
mod projects;
mod requests;
mod rollback;
mod support;
mod trigger;

pub use conversation::TurnOutcome;
pub use error::{ErrorKind, StoreError};
pub use requests::*;

use crate::config::ForkpointConfig;
use fp_core::clock::now_ms;
use fp_core::policy::{AutoCheckpointPolicy, RollbackPolicy};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

const DB_FILE_NAME: &str = "forkpoint.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: Option<PathBuf>,
    auto_checkpoint: AutoCheckpointPolicy,
    rollback: RollbackPolicy,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let config = ForkpointConfig {
            storage_dir: storage_dir.as_ref().to_path_buf(),
            ..ForkpointConfig::default()
        };
        Self::open_with_config(&config)
    }

    pub fn open_with_config(config: &ForkpointConfig) -> Result<Self, StoreError> {
        let storage_dir = config.storage_dir.clone();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        let store = Self::from_connection(conn, Some(storage_dir), config)?;
        tracing::debug!(path = %db_path.display(), "opened checkpoint store");
        Ok(store)
    }

    /// Private database that disappears with the handle; `config.storage_dir` is ignored.
    pub fn open_in_memory(config: &ForkpointConfig) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None, config)
    }

    fn from_connection(
        conn: Connection,
        storage_dir: Option<PathBuf>,
        config: &ForkpointConfig,
    ) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        install_schema(&conn)?;
        Ok(Self {
            conn,
            storage_dir,
            auto_checkpoint: config.auto_checkpoint.clone(),
            rollback: config.rollback.clone(),
        })
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn auto_checkpoint_policy(&self) -> &AutoCheckpointPolicy {
        &self.auto_checkpoint
    }

    pub fn set_auto_checkpoint_policy(&mut self, policy: AutoCheckpointPolicy) {
        self.auto_checkpoint = policy;
    }

    pub fn rollback_policy(&self) -> &RollbackPolicy {
        &self.rollback
    }

    pub fn set_rollback_policy(&mut self, policy: RollbackPolicy) {
        self.rollback = policy;
    }
}
