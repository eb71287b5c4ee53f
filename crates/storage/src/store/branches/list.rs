#![forbid(unsafe_code)]

use super::super::*;
use fp_core::{Branch, BranchId, ProjectId};
use rusqlite::params;

impl SqliteStore {
    /// Branches of the project in creation order.
    pub fn list_branches(&self, project_id: ProjectId) -> Result<Vec<Branch>, StoreError> {
        ensure_project_exists_tx(&self.conn, project_id)?;
        let raws = {
            let mut stmt = self.conn.prepare(&format!(
                "{BRANCH_SELECT} WHERE project_id = ?1 ORDER BY created_at_ms ASC, id ASC"
            ))?;
            stmt.query_map(params![project_id.get()], branch_raw)?
                .collect::<Result<Vec<_>, _>>()?
        };
        raws.into_iter()
            .map(|raw| branch_from_raw(&self.conn, raw))
            .collect()
    }

    pub fn get_branch(&self, branch_id: BranchId) -> Result<Branch, StoreError> {
        load_branch(&self.conn, branch_id)
    }
}
