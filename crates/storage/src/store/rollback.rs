#![forbid(unsafe_code)]

use super::*;
use fp_core::{
    Attributes, Branch, BranchId, Checkpoint, CheckpointTarget, ProjectId, RollbackRequest,
};
use serde_json::Value;

impl SqliteStore {
    /// Forks a new current branch from a checkpoint of the project. The previous current
    /// branch is demoted but kept; nothing changes when any step fails.
    pub fn rollback(&mut self, request: RollbackRequest) -> Result<Branch, StoreError> {
        let RollbackRequest {
            project_id,
            source_branch_id,
            target,
            reason,
        } = request;
        if let CheckpointTarget::Name(name) = &target
            && name.trim().is_empty()
        {
            return Err(StoreError::InvalidInput("checkpoint name must not be empty"));
        }

        let now_ms = now_ms();
        let inherit = self.rollback.inherit_checkpoints;
        let tx = self.conn.transaction()?;
        ensure_project_exists_tx(&tx, project_id)?;

        let checkpoint = resolve_target_tx(&tx, project_id, source_branch_id, &target)?;

        let mut attrs = Attributes::new();
        if let Some(reason) = reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            attrs.insert("reason".to_string(), Value::from(reason));
        }
        let branch_id = seed_branch_tx(&tx, project_id, &checkpoint, attrs, inherit, now_ms)?;
        let previous = promote_branch_tx(&tx, project_id, branch_id, now_ms)?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;

        tracing::info!(
            project = %project_id,
            checkpoint = %checkpoint.id,
            branch = %branch_id,
            previous = ?previous.map(|id| id.get()),
            inherited = branch.checkpoint_count,
            "rolled back to checkpoint"
        );
        Ok(branch)
    }
}

fn resolve_target_tx(
    conn: &Connection,
    project_id: ProjectId,
    source_branch_id: Option<BranchId>,
    target: &CheckpointTarget,
) -> Result<Checkpoint, StoreError> {
    if let Some(branch_id) = source_branch_id
        && branch_project_tx(conn, branch_id)? != project_id
    {
        return Err(StoreError::BranchNotFound(branch_id));
    }

    let not_found = || StoreError::CheckpointNotFound(target.clone());
    match target {
        CheckpointTarget::Id(checkpoint_id) => {
            if checkpoint_project_tx(conn, *checkpoint_id)? != Some(project_id) {
                return Err(not_found());
            }
            load_checkpoint(conn, *checkpoint_id)
        }
        CheckpointTarget::Name(name) => {
            let source = match source_branch_id {
                Some(_) => source_branch_id,
                None => current_branch_id_tx(conn, project_id)?,
            };
            if let Some(branch_id) = source
                && let Some(found) = find_checkpoint_in_branch_tx(conn, branch_id, name)?
            {
                return Ok(found);
            }
            find_checkpoint_in_project_tx(conn, project_id, name)?.ok_or_else(not_found)
        }
    }
}

/// Inserts a non-current branch holding a deep copy of `checkpoint`, optionally carrying
/// over the checkpoints that led up to it.
pub(super) fn seed_branch_tx(
    conn: &Connection,
    project_id: ProjectId,
    checkpoint: &Checkpoint,
    attrs: Attributes,
    inherit_checkpoints: bool,
    now_ms: i64,
) -> Result<BranchId, StoreError> {
    let branch_id = insert_branch_tx(
        conn,
        project_id,
        &checkpoint.state,
        &checkpoint.turns,
        Some(checkpoint.id),
        &attrs,
        now_ms,
    )?;
    if inherit_checkpoints {
        inherit_checkpoints_tx(conn, checkpoint, branch_id)?;
    }
    Ok(branch_id)
}
