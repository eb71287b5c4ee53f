#![forbid(unsafe_code)]

use super::super::*;
use fp_core::CheckpointId;

impl SqliteStore {
    /// Permanent. Branches seeded from the checkpoint keep their copies.
    pub fn delete_checkpoint(&mut self, checkpoint_id: CheckpointId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let branch_id = delete_checkpoint_tx(&tx, checkpoint_id)?;
        tx.commit()?;

        tracing::info!(branch = %branch_id, checkpoint = %checkpoint_id, "deleted checkpoint");
        Ok(())
    }
}
