#![forbid(unsafe_code)]

use fp_core::ids::OwnerId;
use fp_core::{Attributes, BranchId, CheckpointId, ProjectId};

#[derive(Clone, Debug, PartialEq)]
pub struct CreateProjectRequest {
    pub owner: OwnerId,
    pub name: String,
    pub attrs: Attributes,
}

impl CreateProjectRequest {
    pub fn new(owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            attrs: Attributes::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateBranchRequest {
    pub project_id: ProjectId,
    /// Seed the branch from this checkpoint instead of starting empty.
    pub from_checkpoint: Option<CheckpointId>,
    pub attrs: Attributes,
}

impl CreateBranchRequest {
    pub fn empty(project_id: ProjectId) -> Self {
        Self {
            project_id,
            from_checkpoint: None,
            attrs: Attributes::new(),
        }
    }

    pub fn from_checkpoint(project_id: ProjectId, checkpoint_id: CheckpointId) -> Self {
        Self {
            project_id,
            from_checkpoint: Some(checkpoint_id),
            attrs: Attributes::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCheckpointRequest {
    pub branch_id: BranchId,
    /// Generated from the capture time when absent.
    pub name: Option<String>,
    pub automatic: bool,
    pub attrs: Attributes,
}

impl CreateCheckpointRequest {
    pub fn manual(branch_id: BranchId, name: Option<&str>) -> Self {
        Self {
            branch_id,
            name: name.map(str::to_string),
            automatic: false,
            attrs: Attributes::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListCheckpointsRequest {
    pub branch_id: BranchId,
    pub automatic_only: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListCheckpointsRequest {
    pub fn all(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            automatic_only: false,
            limit: None,
            offset: 0,
        }
    }

    pub fn automatic(branch_id: BranchId) -> Self {
        Self {
            automatic_only: true,
            ..Self::all(branch_id)
        }
    }
}
