#![forbid(unsafe_code)]

use fp_core::{BranchId, CheckpointTarget, ProjectId};
use rusqlite::ErrorCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvariantViolation,
    InvalidInput,
    StorageFailure,
    EngineFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(CheckpointTarget),
    #[error("project has no current branch: {0}")]
    NoCurrentBranch(ProjectId),
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
    #[error("engine: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Sql(_) | Self::Json(_) => ErrorKind::StorageFailure,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ProjectNotFound(_)
            | Self::BranchNotFound(_)
            | Self::CheckpointNotFound(_)
            | Self::NoCurrentBranch(_) => ErrorKind::NotFound,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::Engine(_) => ErrorKind::EngineFailure,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::StorageFailure => "STORAGE_FAILURE",
            ErrorKind::EngineFailure => "ENGINE_FAILURE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

// Messages raised by the schema's guard triggers and the one-current-branch index.
const CHECKPOINT_IMMUTABLE: &str = "checkpoint is immutable";
const TURNS_APPEND_ONLY: &str = "turns are append-only";
const CURRENT_BRANCH_UNIQUE: &str = "UNIQUE constraint failed: branches.project_id";

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(message)) = &value
            && code.code == ErrorCode::ConstraintViolation
        {
            if message.contains(CHECKPOINT_IMMUTABLE) {
                return Self::InvariantViolation(CHECKPOINT_IMMUTABLE);
            }
            if message.contains(TURNS_APPEND_ONLY) {
                return Self::InvariantViolation(TURNS_APPEND_ONLY);
            }
            if message.contains(CURRENT_BRANCH_UNIQUE) {
                return Self::InvariantViolation("project already has a current branch");
            }
        }
        Self::Sql(value)
    }
}
