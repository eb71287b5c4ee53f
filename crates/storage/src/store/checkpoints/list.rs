#![forbid(unsafe_code)]

use super::super::*;
use fp_core::Checkpoint;
use rusqlite::params;

impl SqliteStore {
    /// Newest first. `limit: None` returns everything past `offset`.
    pub fn list_checkpoints(
        &self,
        request: ListCheckpointsRequest,
    ) -> Result<Vec<Checkpoint>, StoreError> {
        let ListCheckpointsRequest {
            branch_id,
            automatic_only,
            limit,
            offset,
        } = request;
        branch_project_tx(&self.conn, branch_id)?;

        let limit = match limit {
            Some(limit) => i64::try_from(limit).unwrap_or(i64::MAX),
            None => -1,
        };
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let filter = if automatic_only { "AND c.automatic = 1" } else { "" };

        query_checkpoints(
            &self.conn,
            &format!(
                r#"
                {CHECKPOINT_SELECT}
                WHERE c.branch_id = ?1 {filter}
                {CHECKPOINT_ORDER}
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![branch_id.get(), limit, offset],
        )
    }
}
