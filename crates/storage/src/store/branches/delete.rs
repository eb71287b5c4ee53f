#![forbid(unsafe_code)]

use super::super::*;
use fp_core::BranchId;
use rusqlite::params;

impl SqliteStore {
    /// Deletes the branch with its turns and checkpoints. When the branch was current the
    /// project is left without one until `set_current_branch` or a new branch picks it.
    pub fn delete_branch(&mut self, branch_id: BranchId) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        let was_current = current_branch_id_tx(&tx, project_id)? == Some(branch_id);

        let checkpoints = tx.execute(
            "DELETE FROM checkpoints WHERE branch_id = ?1",
            params![branch_id.get()],
        )?;
        tx.execute("DELETE FROM turns WHERE branch_id = ?1", params![branch_id.get()])?;
        tx.execute("DELETE FROM branches WHERE id = ?1", params![branch_id.get()])?;
        touch_project_tx(&tx, project_id, now_ms)?;
        tx.commit()?;

        tracing::info!(
            project = %project_id,
            branch = %branch_id,
            checkpoints,
            was_current,
            "deleted branch"
        );
        Ok(())
    }
}
