#![forbid(unsafe_code)]

use super::*;
use fp_core::{Attributes, BranchId, Checkpoint};
use serde_json::Value;

impl SqliteStore {
    /// Reports a mutation of the branch. Captures an automatic checkpoint when the policy
    /// accepts `trigger_tag`; returns `None` otherwise.
    pub fn on_mutation(
        &mut self,
        branch_id: BranchId,
        trigger_tag: Option<&str>,
    ) -> Result<Option<Checkpoint>, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let checkpoint = mutation_tx(&self.auto_checkpoint, &tx, branch_id, trigger_tag, now_ms)?;
        tx.commit()?;
        Ok(checkpoint)
    }

    /// Keeps the newest `keep_latest` automatic checkpoints of the branch.
    pub fn prune(&mut self, branch_id: BranchId, keep_latest: usize) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        branch_project_tx(&tx, branch_id)?;
        let removed = prune_auto_checkpoints_tx(&tx, branch_id, keep_latest)?;
        tx.commit()?;

        if removed > 0 {
            tracing::info!(
                branch = %branch_id,
                removed,
                keep_latest,
                "pruned automatic checkpoints"
            );
        }
        Ok(removed)
    }
}

/// Auto-checkpoint step shared by `on_mutation` and the conversation driver. Runs inside the
/// caller's transaction.
pub(super) fn mutation_tx(
    policy: &AutoCheckpointPolicy,
    conn: &Connection,
    branch_id: BranchId,
    trigger_tag: Option<&str>,
    now_ms: i64,
) -> Result<Option<Checkpoint>, StoreError> {
    let project_id = branch_project_tx(conn, branch_id)?;
    let Some(tag) = policy.capture_tag(trigger_tag) else {
        return Ok(None);
    };

    let mut attrs = Attributes::new();
    attrs.insert("trigger".to_string(), Value::from(tag));
    let checkpoint = capture_checkpoint_tx(
        conn,
        branch_id,
        CheckpointLabel::Trigger(tag),
        true,
        &attrs,
        now_ms,
    )?;
    touch_project_tx(conn, project_id, now_ms)?;

    let pruned = if policy.prune_after_capture {
        prune_auto_checkpoints_tx(conn, branch_id, policy.keep_latest)?
    } else {
        0
    };

    tracing::debug!(
        branch = %branch_id,
        checkpoint = %checkpoint.id,
        tag,
        pruned,
        "auto checkpoint"
    );
    Ok(Some(checkpoint))
}
