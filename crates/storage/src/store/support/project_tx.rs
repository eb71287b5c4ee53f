#![forbid(unsafe_code)]

use super::super::StoreError;
use super::json::decode_object;
use fp_core::ids::OwnerId;
use fp_core::{BranchId, Project, ProjectId};
use rusqlite::{Connection, OptionalExtension, params};

pub(in crate::store) const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.owner, p.name, p.active, p.attrs_json, p.created_at_ms, p.updated_at_ms,
           (SELECT b.id FROM branches b WHERE b.project_id = p.id AND b.is_current = 1)
    FROM projects p
"#;

pub(in crate::store) type ProjectRaw = (i64, String, String, i64, String, i64, i64, Option<i64>);

pub(in crate::store) fn project_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRaw> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

pub(in crate::store) fn project_from_raw(raw: ProjectRaw) -> Result<Project, StoreError> {
    let (id, owner, name, active, attrs_json, created_at_ms, updated_at_ms, current) = raw;
    let owner =
        OwnerId::try_new(owner).map_err(|_| StoreError::InvalidInput("invalid project row"))?;
    Ok(Project {
        id: ProjectId::new(id),
        owner,
        name,
        active: active != 0,
        current_branch_id: current.map(BranchId::new),
        created_at_ms,
        updated_at_ms,
        attrs: decode_object(&attrs_json)?,
    })
}

pub(in crate::store) fn load_project(
    conn: &Connection,
    project_id: ProjectId,
) -> Result<Project, StoreError> {
    let raw = conn
        .query_row(
            &format!("{PROJECT_SELECT} WHERE p.id = ?1"),
            params![project_id.get()],
            project_raw,
        )
        .optional()?;
    match raw {
        Some(raw) => project_from_raw(raw),
        None => Err(StoreError::ProjectNotFound(project_id)),
    }
}

pub(in crate::store) fn ensure_project_exists_tx(
    conn: &Connection,
    project_id: ProjectId,
) -> Result<(), StoreError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM projects WHERE id = ?1",
            params![project_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(StoreError::ProjectNotFound(project_id))
    }
}

pub(in crate::store) fn touch_project_tx(
    conn: &Connection,
    project_id: ProjectId,
    now_ms: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE projects SET updated_at_ms = MAX(updated_at_ms, ?2) WHERE id = ?1",
        params![project_id.get(), now_ms],
    )?;
    Ok(())
}
