#![forbid(unsafe_code)]

use super::{BranchId, CheckpointId, ProjectId};
use crate::ids::OwnerId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form structured state carried by a branch. Keys are strings, values are any JSON.
pub type StateBlob = Map<String, Value>;

/// Free-form attribute map attached to projects, branches, checkpoints and turns.
pub type Attributes = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            "tool" => Some(Role::Tool),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at_ms: i64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Attributes,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            role,
            content: content.into(),
            created_at_ms,
            meta: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: OwnerId,
    pub name: String,
    pub active: bool,
    pub current_branch_id: Option<BranchId>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub attrs: Attributes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub project_id: ProjectId,
    pub state: StateBlob,
    pub turns: Vec<Turn>,
    pub is_current: bool,
    pub checkpoint_count: u64,
    pub forked_from: Option<CheckpointId>,
    pub created_at_ms: i64,
    pub attrs: Attributes,
}

impl Branch {
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// Immutable capture of a branch's state and turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub branch_id: BranchId,
    pub name: String,
    pub state: StateBlob,
    pub turns: Vec<Turn>,
    pub automatic: bool,
    pub created_at_ms: i64,
    pub attrs: Attributes,
}

impl Checkpoint {
    pub fn kind_label(&self) -> &'static str {
        if self.automatic { "auto" } else { "manual" }
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointCounts {
    pub total: u64,
    pub automatic: u64,
    pub manual: u64,
}

/// How a rollback names the checkpoint it wants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointTarget {
    Id(CheckpointId),
    Name(String),
}

impl CheckpointTarget {
    /// Numeric input (or `checkpoint#N`) selects by id, anything else by name.
    pub fn parse(value: &str) -> Self {
        match value.parse::<CheckpointId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(value.trim().to_string()),
        }
    }
}

impl std::fmt::Display for CheckpointTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<CheckpointId> for CheckpointTarget {
    fn from(value: CheckpointId) -> Self {
        Self::Id(value)
    }
}

/// Explicit restore request handed over by the engine layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRequest {
    pub project_id: ProjectId,
    /// Branch searched first when resolving by name; defaults to the project's current branch.
    pub source_branch_id: Option<BranchId>,
    pub target: CheckpointTarget,
    pub reason: Option<String>,
}

impl RollbackRequest {
    pub fn new(project_id: ProjectId, target: impl Into<CheckpointTarget>) -> Self {
        Self {
            project_id,
            source_branch_id: None,
            target: target.into(),
            reason: None,
        }
    }

    pub fn by_name(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self::new(project_id, CheckpointTarget::Name(name.into()))
    }

    pub fn from_branch(mut self, branch_id: BranchId) -> Self {
        self.source_branch_id = Some(branch_id);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Shallow merge of `patch` into `state`: top-level keys are replaced, never deep-merged.
pub fn merge_state(state: &mut StateBlob, patch: &StateBlob) {
    for (key, value) in patch {
        state.insert(key.clone(), value.clone());
    }
}
