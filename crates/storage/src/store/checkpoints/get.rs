#![forbid(unsafe_code)]

use super::super::*;
use fp_core::{BranchId, Checkpoint, CheckpointCounts, CheckpointId};
use rusqlite::params;

impl SqliteStore {
    pub fn get_checkpoint(&self, checkpoint_id: CheckpointId) -> Result<Checkpoint, StoreError> {
        load_checkpoint(&self.conn, checkpoint_id)
    }

    pub fn latest_checkpoint(&self, branch_id: BranchId) -> Result<Option<Checkpoint>, StoreError> {
        branch_project_tx(&self.conn, branch_id)?;
        let found = query_checkpoints(
            &self.conn,
            &format!("{CHECKPOINT_SELECT} WHERE c.branch_id = ?1 {CHECKPOINT_ORDER} LIMIT 1"),
            params![branch_id.get()],
        )?;
        Ok(found.into_iter().next())
    }

    pub fn count_checkpoints(&self, branch_id: BranchId) -> Result<CheckpointCounts, StoreError> {
        branch_project_tx(&self.conn, branch_id)?;
        let (total, automatic) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(automatic), 0) FROM checkpoints WHERE branch_id = ?1",
            params![branch_id.get()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        let total = u64::try_from(total).unwrap_or(0);
        let automatic = u64::try_from(automatic).unwrap_or(0);
        Ok(CheckpointCounts {
            total,
            automatic,
            manual: total.saturating_sub(automatic),
        })
    }
}
