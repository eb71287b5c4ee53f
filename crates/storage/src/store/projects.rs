#![forbid(unsafe_code)]

use super::*;
use fp_core::ids::OwnerId;
use fp_core::{Project, ProjectId, normalize_name};
use rusqlite::params;

impl SqliteStore {
    pub fn create_project(&mut self, request: CreateProjectRequest) -> Result<Project, StoreError> {
        let CreateProjectRequest { owner, name, attrs } = request;
        let name = normalize_name(&name).map_err(|err| StoreError::InvalidInput(err.message()))?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO projects(owner, name, active, attrs_json, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, 1, ?3, ?4, ?4)
            "#,
            params![owner.as_str(), name, encode_object(&attrs)?, now_ms],
        )?;
        let project_id = ProjectId::new(tx.last_insert_rowid());
        let project = load_project(&tx, project_id)?;
        tx.commit()?;

        tracing::info!(project = %project_id, owner = %owner, "created project");
        Ok(project)
    }

    pub fn get_project(&self, project_id: ProjectId) -> Result<Project, StoreError> {
        load_project(&self.conn, project_id)
    }

    /// Projects owned by `owner`, oldest first.
    pub fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT} WHERE p.owner = ?1 ORDER BY p.created_at_ms ASC, p.id ASC"
        ))?;
        let raws = stmt
            .query_map(params![owner.as_str()], project_raw)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(project_from_raw).collect()
    }

    pub fn rename_project(
        &mut self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Project, StoreError> {
        let name = normalize_name(name).map_err(|err| StoreError::InvalidInput(err.message()))?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE projects SET name = ?2, updated_at_ms = MAX(updated_at_ms, ?3) WHERE id = ?1",
            params![project_id.get(), name, now_ms],
        )?;
        if updated == 0 {
            return Err(StoreError::ProjectNotFound(project_id));
        }
        let project = load_project(&tx, project_id)?;
        tx.commit()?;
        Ok(project)
    }

    pub fn set_project_active(
        &mut self,
        project_id: ProjectId,
        active: bool,
    ) -> Result<Project, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE projects SET active = ?2, updated_at_ms = MAX(updated_at_ms, ?3) WHERE id = ?1",
            params![project_id.get(), i64::from(active), now_ms],
        )?;
        if updated == 0 {
            return Err(StoreError::ProjectNotFound(project_id));
        }
        let project = load_project(&tx, project_id)?;
        tx.commit()?;
        Ok(project)
    }

    /// Removes the project with every branch, turn and checkpoint beneath it.
    pub fn delete_project(&mut self, project_id: ProjectId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        ensure_project_exists_tx(&tx, project_id)?;

        let checkpoints = tx.execute(
            r#"
            DELETE FROM checkpoints
            WHERE branch_id IN (SELECT id FROM branches WHERE project_id = ?1)
            "#,
            params![project_id.get()],
        )?;
        tx.execute(
            r#"
            DELETE FROM turns
            WHERE branch_id IN (SELECT id FROM branches WHERE project_id = ?1)
            "#,
            params![project_id.get()],
        )?;
        let branches = tx.execute(
            "DELETE FROM branches WHERE project_id = ?1",
            params![project_id.get()],
        )?;
        tx.execute("DELETE FROM projects WHERE id = ?1", params![project_id.get()])?;
        tx.commit()?;

        tracing::info!(project = %project_id, branches, checkpoints, "deleted project");
        Ok(())
    }
}
