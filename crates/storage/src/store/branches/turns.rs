#![forbid(unsafe_code)]

use super::super::*;
use fp_core::{Attributes, Branch, BranchId, Role, StateBlob, Turn, merge_state};

impl SqliteStore {
    /// Appends one turn to the live branch. Never captures a checkpoint.
    pub fn append_turn(
        &mut self,
        branch_id: BranchId,
        role: Role,
        content: &str,
    ) -> Result<Branch, StoreError> {
        self.append_turn_with_meta(branch_id, role, content, Attributes::new())
    }

    pub fn append_turn_with_meta(
        &mut self,
        branch_id: BranchId,
        role: Role,
        content: &str,
        meta: Attributes,
    ) -> Result<Branch, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        let turn = Turn {
            role,
            content: content.to_string(),
            created_at_ms: now_ms,
            meta,
        };
        append_turn_tx(&tx, branch_id, &turn)?;
        touch_project_tx(&tx, project_id, now_ms)?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;
        Ok(branch)
    }

    /// Shallow-merges `patch` into the branch state. Never captures a checkpoint.
    pub fn update_state(
        &mut self,
        branch_id: BranchId,
        patch: &StateBlob,
    ) -> Result<Branch, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        let mut state = branch_state_tx(&tx, branch_id)?;
        merge_state(&mut state, patch);
        write_state_tx(&tx, branch_id, &state)?;
        touch_project_tx(&tx, project_id, now_ms)?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;
        Ok(branch)
    }
}
