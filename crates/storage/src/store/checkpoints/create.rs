#![forbid(unsafe_code)]

use super::super::*;
use fp_core::Checkpoint;

impl SqliteStore {
    /// Captures the branch's current state and turns. The read and the insert share one
    /// transaction, so the checkpoint never mixes two versions of the branch.
    pub fn create_checkpoint(
        &mut self,
        request: CreateCheckpointRequest,
    ) -> Result<Checkpoint, StoreError> {
        let CreateCheckpointRequest {
            branch_id,
            name,
            automatic,
            attrs,
        } = request;
        let label = match name.as_deref() {
            Some(name) => CheckpointLabel::Given(name),
            None => CheckpointLabel::Timestamp,
        };

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        let checkpoint = capture_checkpoint_tx(&tx, branch_id, label, automatic, &attrs, now_ms)?;
        touch_project_tx(&tx, project_id, now_ms)?;
        tx.commit()?;

        tracing::info!(
            branch = %branch_id,
            checkpoint = %checkpoint.id,
            kind = checkpoint.kind_label(),
            turns = checkpoint.turn_count(),
            "created checkpoint"
        );
        Ok(checkpoint)
    }
}
