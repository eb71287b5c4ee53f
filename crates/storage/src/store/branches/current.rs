#![forbid(unsafe_code)]

use super::super::*;
use fp_core::{Branch, BranchId, ProjectId};

impl SqliteStore {
    pub fn get_current_branch(&self, project_id: ProjectId) -> Result<Branch, StoreError> {
        ensure_project_exists_tx(&self.conn, project_id)?;
        match current_branch_id_tx(&self.conn, project_id)? {
            Some(branch_id) => load_branch(&self.conn, branch_id),
            None => Err(StoreError::NoCurrentBranch(project_id)),
        }
    }

    /// Makes `branch_id` the current branch of its project. Selecting the branch that is
    /// already current is a no-op.
    pub fn set_current_branch(&mut self, branch_id: BranchId) -> Result<Branch, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        let previous = promote_branch_tx(&tx, project_id, branch_id, now_ms)?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;

        if let Some(previous) = previous {
            tracing::debug!(
                project = %project_id,
                branch = %branch_id,
                previous = %previous,
                "switched current branch"
            );
        }
        Ok(branch)
    }
}
