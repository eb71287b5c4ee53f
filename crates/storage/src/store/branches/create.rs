#![forbid(unsafe_code)]

use super::super::rollback::seed_branch_tx;
use super::super::*;
use fp_core::Branch;

impl SqliteStore {
    /// Creates a branch and makes it the project's current one. A seed checkpoint must belong
    /// to the same project.
    pub fn create_branch(&mut self, request: CreateBranchRequest) -> Result<Branch, StoreError> {
        let CreateBranchRequest {
            project_id,
            from_checkpoint,
            attrs,
        } = request;

        let now_ms = now_ms();
        let inherit = self.rollback.inherit_checkpoints;
        let tx = self.conn.transaction()?;
        ensure_project_exists_tx(&tx, project_id)?;

        let branch_id = match from_checkpoint {
            Some(checkpoint_id) => {
                if checkpoint_project_tx(&tx, checkpoint_id)? != Some(project_id) {
                    return Err(StoreError::CheckpointNotFound(checkpoint_id.into()));
                }
                let checkpoint = load_checkpoint(&tx, checkpoint_id)?;
                seed_branch_tx(&tx, project_id, &checkpoint, attrs, inherit, now_ms)?
            }
            None => insert_branch_tx(
                &tx,
                project_id,
                &Default::default(),
                &[],
                None,
                &attrs,
                now_ms,
            )?,
        };
        let previous = promote_branch_tx(&tx, project_id, branch_id, now_ms)?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;

        tracing::info!(
            project = %project_id,
            branch = %branch_id,
            previous = ?previous.map(|id| id.get()),
            seeded_from = ?from_checkpoint.map(|id| id.get()),
            "created branch"
        );
        Ok(branch)
    }
}
