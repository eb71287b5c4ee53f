#![forbid(unsafe_code)]

use super::trigger::mutation_tx;
use super::*;
use fp_core::engine::{ConversationEngine, EngineReply};
use fp_core::{Branch, BranchId, Checkpoint, Role, Turn, merge_state};

#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    /// Branch after the assistant turn and state patch were recorded.
    pub branch: Branch,
    pub reply: EngineReply,
    pub checkpoint: Option<Checkpoint>,
}

impl SqliteStore {
    /// Records `user_content`, asks `engine` for a reply and records that too, then reports the
    /// mutation to the auto-checkpoint trigger. The engine runs outside any transaction: when it
    /// fails the user turn stays recorded and nothing else changes.
    pub fn run_turn<E: ConversationEngine>(
        &mut self,
        engine: &mut E,
        branch_id: BranchId,
        user_content: &str,
    ) -> Result<TurnOutcome, StoreError> {
        let before = self.append_turn(branch_id, Role::User, user_content)?;

        let reply = engine
            .respond(&before.turns, &before.state)
            .map_err(|err| StoreError::Engine(Box::new(err)))?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let project_id = branch_project_tx(&tx, branch_id)?;
        append_turn_tx(
            &tx,
            branch_id,
            &Turn::new(Role::Assistant, reply.content.clone(), now_ms),
        )?;
        if !reply.state_patch.is_empty() {
            let mut state = branch_state_tx(&tx, branch_id)?;
            merge_state(&mut state, &reply.state_patch);
            write_state_tx(&tx, branch_id, &state)?;
        }
        touch_project_tx(&tx, project_id, now_ms)?;
        let checkpoint = mutation_tx(
            &self.auto_checkpoint,
            &tx,
            branch_id,
            reply.trigger_tag.as_deref(),
            now_ms,
        )?;
        let branch = load_branch(&tx, branch_id)?;
        tx.commit()?;

        Ok(TurnOutcome {
            branch,
            reply,
            checkpoint,
        })
    }
}
