#![forbid(unsafe_code)]

use super::super::StoreError;
use super::json::{decode_object, encode_object};
use fp_core::{Attributes, Branch, BranchId, CheckpointId, ProjectId, Role, StateBlob, Turn};
use rusqlite::{Connection, OptionalExtension, params};

pub(in crate::store) const BRANCH_SELECT: &str = r#"
    SELECT id, project_id, state_json, is_current, checkpoint_count, forked_from,
           attrs_json, created_at_ms
    FROM branches
"#;

pub(in crate::store) type BranchRaw = (i64, i64, String, i64, i64, Option<i64>, String, i64);

pub(in crate::store) fn branch_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<BranchRaw> {
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

pub(in crate::store) fn branch_from_raw(
    conn: &Connection,
    raw: BranchRaw,
) -> Result<Branch, StoreError> {
    let (
        id,
        project_id,
        state_json,
        is_current,
        checkpoint_count,
        forked_from,
        attrs_json,
        created_at_ms,
    ) = raw;
    let id = BranchId::new(id);
    let checkpoint_count = u64::try_from(checkpoint_count)
        .map_err(|_| StoreError::InvalidInput("invalid branch row"))?;
    Ok(Branch {
        id,
        project_id: ProjectId::new(project_id),
        state: decode_object(&state_json)?,
        turns: load_turns(conn, id)?,
        is_current: is_current != 0,
        checkpoint_count,
        forked_from: forked_from.map(CheckpointId::new),
        created_at_ms,
        attrs: decode_object(&attrs_json)?,
    })
}

pub(in crate::store) fn load_branch(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<Branch, StoreError> {
    let raw = conn
        .query_row(
            &format!("{BRANCH_SELECT} WHERE id = ?1"),
            params![branch_id.get()],
            branch_raw,
        )
        .optional()?;
    match raw {
        Some(raw) => branch_from_raw(conn, raw),
        None => Err(StoreError::BranchNotFound(branch_id)),
    }
}

pub(in crate::store) fn branch_project_tx(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<ProjectId, StoreError> {
    conn.query_row(
        "SELECT project_id FROM branches WHERE id = ?1",
        params![branch_id.get()],
        |row| row.get::<_, i64>(0),
    )
    .optional()?
    .map(ProjectId::new)
    .ok_or(StoreError::BranchNotFound(branch_id))
}

pub(in crate::store) fn branch_state_tx(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<StateBlob, StoreError> {
    let state_json = conn
        .query_row(
            "SELECT state_json FROM branches WHERE id = ?1",
            params![branch_id.get()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    let Some(state_json) = state_json else {
        return Err(StoreError::BranchNotFound(branch_id));
    };
    decode_object(&state_json)
}

pub(in crate::store) fn load_turns(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<Vec<Turn>, StoreError> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT role, content, meta_json, created_at_ms
        FROM turns
        WHERE branch_id = ?1
        ORDER BY seq ASC
        "#,
    )?;
    let mut rows = stmt.query(params![branch_id.get()])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let role = row.get::<_, String>(0)?;
        let role = Role::parse(&role).ok_or(StoreError::InvalidInput("invalid turn row"))?;
        out.push(Turn {
            role,
            content: row.get::<_, String>(1)?,
            meta: decode_object(&row.get::<_, String>(2)?)?,
            created_at_ms: row.get::<_, i64>(3)?,
        });
    }
    Ok(out)
}

/// Inserts a non-current branch together with its initial turns.
pub(in crate::store) fn insert_branch_tx(
    conn: &Connection,
    project_id: ProjectId,
    state: &StateBlob,
    turns: &[Turn],
    forked_from: Option<CheckpointId>,
    attrs: &Attributes,
    now_ms: i64,
) -> Result<BranchId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO branches(
          project_id, state_json, is_current, checkpoint_count, capture_seq,
          forked_from, attrs_json, created_at_ms
        )
        VALUES (?1, ?2, 0, 0, 0, ?3, ?4, ?5)
        "#,
        params![
            project_id.get(),
            encode_object(state)?,
            forked_from.map(CheckpointId::get),
            encode_object(attrs)?,
            now_ms,
        ],
    )?;
    let branch_id = BranchId::new(conn.last_insert_rowid());
    for turn in turns {
        append_turn_tx(conn, branch_id, turn)?;
    }
    Ok(branch_id)
}

pub(in crate::store) fn append_turn_tx(
    conn: &Connection,
    branch_id: BranchId,
    turn: &Turn,
) -> Result<i64, StoreError> {
    let seq = conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM turns WHERE branch_id = ?1",
        params![branch_id.get()],
        |row| row.get::<_, i64>(0),
    )?;
    conn.execute(
        r#"
        INSERT INTO turns(branch_id, seq, role, content, meta_json, created_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            branch_id.get(),
            seq,
            turn.role.as_str(),
            turn.content,
            encode_object(&turn.meta)?,
            turn.created_at_ms,
        ],
    )?;
    Ok(seq)
}

pub(in crate::store) fn write_state_tx(
    conn: &Connection,
    branch_id: BranchId,
    state: &StateBlob,
) -> Result<(), StoreError> {
    let updated = conn.execute(
        "UPDATE branches SET state_json = ?2 WHERE id = ?1",
        params![branch_id.get(), encode_object(state)?],
    )?;
    if updated == 0 {
        return Err(StoreError::BranchNotFound(branch_id));
    }
    Ok(())
}

pub(in crate::store) fn current_branch_id_tx(
    conn: &Connection,
    project_id: ProjectId,
) -> Result<Option<BranchId>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id FROM branches WHERE project_id = ?1 AND is_current = 1",
            params![project_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .map(BranchId::new))
}

/// Demotes the project's current branch and promotes `branch_id`. Callers run this inside
/// the same transaction as the write that produced `branch_id`.
pub(in crate::store) fn promote_branch_tx(
    conn: &Connection,
    project_id: ProjectId,
    branch_id: BranchId,
    now_ms: i64,
) -> Result<Option<BranchId>, StoreError> {
    let previous = current_branch_id_tx(conn, project_id)?;
    conn.execute(
        r#"
        UPDATE branches SET is_current = 0
        WHERE project_id = ?1 AND is_current = 1 AND id <> ?2
        "#,
        params![project_id.get(), branch_id.get()],
    )?;
    let promoted = conn.execute(
        "UPDATE branches SET is_current = 1 WHERE id = ?1 AND project_id = ?2",
        params![branch_id.get(), project_id.get()],
    )?;
    if promoted != 1 {
        return Err(StoreError::BranchNotFound(branch_id));
    }
    super::project_tx::touch_project_tx(conn, project_id, now_ms)?;
    Ok(previous.filter(|previous| *previous != branch_id))
}

pub(in crate::store) fn adjust_checkpoint_count_tx(
    conn: &Connection,
    branch_id: BranchId,
    delta: i64,
) -> Result<(), StoreError> {
    let updated = conn.execute(
        "UPDATE branches SET checkpoint_count = checkpoint_count + ?2 WHERE id = ?1",
        params![branch_id.get(), delta],
    )?;
    if updated == 0 {
        return Err(StoreError::BranchNotFound(branch_id));
    }
    Ok(())
}

/// Bumps and returns the branch's capture sequence. Deletes and prunes never lower it, so
/// numbered labels stay unique on the branch.
pub(in crate::store) fn next_capture_seq_tx(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<u64, StoreError> {
    let updated = conn.execute(
        "UPDATE branches SET capture_seq = capture_seq + 1 WHERE id = ?1",
        params![branch_id.get()],
    )?;
    if updated == 0 {
        return Err(StoreError::BranchNotFound(branch_id));
    }
    let seq = conn.query_row(
        "SELECT capture_seq FROM branches WHERE id = ?1",
        params![branch_id.get()],
        |row| row.get::<_, i64>(0),
    )?;
    u64::try_from(seq).map_err(|_| StoreError::InvalidInput("invalid branch row"))
}

/// Continues `to_branch`'s numbering after everything `from_branch` has captured so far.
pub(in crate::store) fn carry_capture_seq_tx(
    conn: &Connection,
    from_branch: BranchId,
    to_branch: BranchId,
) -> Result<(), StoreError> {
    conn.execute(
        r#"
        UPDATE branches
        SET capture_seq = MAX(capture_seq, (SELECT capture_seq FROM branches WHERE id = ?1))
        WHERE id = ?2
        "#,
        params![from_branch.get(), to_branch.get()],
    )?;
    Ok(())
}
