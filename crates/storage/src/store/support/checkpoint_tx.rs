#![forbid(unsafe_code)]

use super::super::StoreError;
use super::branch_tx::{
    adjust_checkpoint_count_tx, branch_state_tx, carry_capture_seq_tx, load_turns,
    next_capture_seq_tx,
};
use super::json::{decode_object, decode_turns, encode_object, encode_turns};
use fp_core::{
    Attributes, BranchId, Checkpoint, CheckpointId, CheckpointTarget, ProjectId,
    auto_checkpoint_label, manual_checkpoint_label, name_lookup_key, normalize_name,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

pub(in crate::store) const CHECKPOINT_SELECT: &str = r#"
    SELECT c.id, c.branch_id, c.name, c.state_json, c.turns_json, c.automatic,
           c.attrs_json, c.created_at_ms
    FROM checkpoints c
"#;

/// Newest first; ids break ties between captures in the same millisecond.
pub(in crate::store) const CHECKPOINT_ORDER: &str = "ORDER BY c.created_at_ms DESC, c.id DESC";

pub(in crate::store) type CheckpointRaw = (i64, i64, String, String, String, i64, String, i64);

pub(in crate::store) fn checkpoint_raw(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<CheckpointRaw> {
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

pub(in crate::store) fn checkpoint_from_raw(raw: CheckpointRaw) -> Result<Checkpoint, StoreError> {
    let (id, branch_id, name, state_json, turns_json, automatic, attrs_json, created_at_ms) = raw;
    Ok(Checkpoint {
        id: CheckpointId::new(id),
        branch_id: BranchId::new(branch_id),
        name,
        state: decode_object(&state_json)?,
        turns: decode_turns(&turns_json)?,
        automatic: automatic != 0,
        created_at_ms,
        attrs: decode_object(&attrs_json)?,
    })
}

pub(in crate::store) fn query_checkpoints(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Checkpoint>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let raws = stmt
        .query_map(params, checkpoint_raw)?
        .collect::<Result<Vec<_>, _>>()?;
    raws.into_iter().map(checkpoint_from_raw).collect()
}

pub(in crate::store) fn load_checkpoint(
    conn: &Connection,
    checkpoint_id: CheckpointId,
) -> Result<Checkpoint, StoreError> {
    let raw = conn
        .query_row(
            &format!("{CHECKPOINT_SELECT} WHERE c.id = ?1"),
            params![checkpoint_id.get()],
            checkpoint_raw,
        )
        .optional()?;
    match raw {
        Some(raw) => checkpoint_from_raw(raw),
        None => Err(StoreError::CheckpointNotFound(CheckpointTarget::Id(
            checkpoint_id,
        ))),
    }
}

/// Project that owns the checkpoint, through its branch.
pub(in crate::store) fn checkpoint_project_tx(
    conn: &Connection,
    checkpoint_id: CheckpointId,
) -> Result<Option<ProjectId>, StoreError> {
    Ok(conn
        .query_row(
            r#"
            SELECT b.project_id
            FROM checkpoints c
            JOIN branches b ON b.id = c.branch_id
            WHERE c.id = ?1
            "#,
            params![checkpoint_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .map(ProjectId::new))
}

pub(in crate::store) enum CheckpointLabel<'a> {
    Given(&'a str),
    Timestamp,
    Trigger(&'a str),
}

/// Copies the branch's live state and turns into a new checkpoint row, bumps the branch
/// counter and its capture sequence. Runs inside the caller's transaction.
pub(in crate::store) fn capture_checkpoint_tx(
    conn: &Connection,
    branch_id: BranchId,
    label: CheckpointLabel<'_>,
    automatic: bool,
    attrs: &Attributes,
    now_ms: i64,
) -> Result<Checkpoint, StoreError> {
    let state = branch_state_tx(conn, branch_id)?;
    let turns = load_turns(conn, branch_id)?;

    let sequence = next_capture_seq_tx(conn, branch_id)?;

    let name = match label {
        CheckpointLabel::Given(name) => {
            normalize_name(name).map_err(|err| StoreError::InvalidInput(err.message()))?
        }
        CheckpointLabel::Timestamp => manual_checkpoint_label(now_ms),
        CheckpointLabel::Trigger(tag) => auto_checkpoint_label(tag, sequence),
    };

    let checkpoint_id = insert_checkpoint_row_tx(
        conn,
        branch_id,
        &name,
        &encode_object(&state)?,
        &encode_turns(&turns)?,
        automatic,
        attrs,
        now_ms,
    )?;

    Ok(Checkpoint {
        id: checkpoint_id,
        branch_id,
        name,
        state,
        turns,
        automatic,
        created_at_ms: now_ms,
        attrs: attrs.clone(),
    })
}

#[allow(clippy::too_many_arguments)]
fn insert_checkpoint_row_tx(
    conn: &Connection,
    branch_id: BranchId,
    name: &str,
    state_json: &str,
    turns_json: &str,
    automatic: bool,
    attrs: &Attributes,
    created_at_ms: i64,
) -> Result<CheckpointId, StoreError> {
    conn.execute(
        r#"
        INSERT INTO checkpoints(
          branch_id, name, name_key, state_json, turns_json, automatic, attrs_json, created_at_ms
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            branch_id.get(),
            name,
            name_lookup_key(name),
            state_json,
            turns_json,
            i64::from(automatic),
            encode_object(attrs)?,
            created_at_ms,
        ],
    )?;
    let checkpoint_id = CheckpointId::new(conn.last_insert_rowid());
    adjust_checkpoint_count_tx(conn, branch_id, 1)?;
    Ok(checkpoint_id)
}

/// Deletes one checkpoint and returns the branch that owned it.
pub(in crate::store) fn delete_checkpoint_tx(
    conn: &Connection,
    checkpoint_id: CheckpointId,
) -> Result<BranchId, StoreError> {
    let branch_id = conn
        .query_row(
            "SELECT branch_id FROM checkpoints WHERE id = ?1",
            params![checkpoint_id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .map(BranchId::new)
        .ok_or(StoreError::CheckpointNotFound(CheckpointTarget::Id(
            checkpoint_id,
        )))?;

    conn.execute(
        "DELETE FROM checkpoints WHERE id = ?1",
        params![checkpoint_id.get()],
    )?;
    adjust_checkpoint_count_tx(conn, branch_id, -1)?;
    Ok(branch_id)
}

/// Removes automatic checkpoints beyond the newest `keep_latest`. Manual ones are untouched.
pub(in crate::store) fn prune_auto_checkpoints_tx(
    conn: &Connection,
    branch_id: BranchId,
    keep_latest: usize,
) -> Result<usize, StoreError> {
    let keep = i64::try_from(keep_latest).unwrap_or(i64::MAX);
    let doomed = {
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id FROM checkpoints c
            WHERE c.branch_id = ?1 AND c.automatic = 1
            ORDER BY c.created_at_ms DESC, c.id DESC
            LIMIT -1 OFFSET ?2
            "#,
        )?;
        stmt.query_map(params![branch_id.get(), keep], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?
    };

    for id in &doomed {
        conn.execute("DELETE FROM checkpoints WHERE id = ?1", params![id])?;
    }
    if !doomed.is_empty() {
        let removed = i64::try_from(doomed.len()).unwrap_or(i64::MAX);
        adjust_checkpoint_count_tx(conn, branch_id, -removed)?;
    }
    Ok(doomed.len())
}

/// Copies every checkpoint of `target.branch_id` captured at or before `target` onto
/// `to_branch`, oldest first, keeping names, payloads, flags and capture times. The new
/// branch continues the source branch's capture numbering.
pub(in crate::store) fn inherit_checkpoints_tx(
    conn: &Connection,
    target: &Checkpoint,
    to_branch: BranchId,
) -> Result<usize, StoreError> {
    let sources = {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, state_json, turns_json, automatic, attrs_json, created_at_ms
            FROM checkpoints
            WHERE branch_id = ?1
              AND (created_at_ms < ?2 OR (created_at_ms = ?2 AND id <= ?3))
            ORDER BY created_at_ms ASC, id ASC
            "#,
        )?;
        stmt.query_map(
            params![
                target.branch_id.get(),
                target.created_at_ms,
                target.id.get()
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?
    };

    for (id, name, state_json, turns_json, automatic, attrs_json, created_at_ms) in &sources {
        let mut attrs = decode_object(attrs_json)?;
        attrs.insert("inherited_from".to_string(), Value::from(*id));
        insert_checkpoint_row_tx(
            conn,
            to_branch,
            name,
            state_json,
            turns_json,
            *automatic != 0,
            &attrs,
            *created_at_ms,
        )?;
    }
    carry_capture_seq_tx(conn, target.branch_id, to_branch)?;
    Ok(sources.len())
}

/// Most recent checkpoint on `branch_id` whose name matches case-insensitively.
pub(in crate::store) fn find_checkpoint_in_branch_tx(
    conn: &Connection,
    branch_id: BranchId,
    name: &str,
) -> Result<Option<Checkpoint>, StoreError> {
    let found = query_checkpoints(
        conn,
        &format!(
            r#"
            {CHECKPOINT_SELECT}
            WHERE c.branch_id = ?1 AND c.name_key = ?2
            {CHECKPOINT_ORDER}
            LIMIT 1
            "#
        ),
        params![branch_id.get(), name_lookup_key(name)],
    )?;
    Ok(found.into_iter().next())
}

/// Most recent checkpoint anywhere in the project whose name matches case-insensitively.
pub(in crate::store) fn find_checkpoint_in_project_tx(
    conn: &Connection,
    project_id: ProjectId,
    name: &str,
) -> Result<Option<Checkpoint>, StoreError> {
    let found = query_checkpoints(
        conn,
        &format!(
            r#"
            {CHECKPOINT_SELECT}
            JOIN branches b ON b.id = c.branch_id
            WHERE b.project_id = ?1 AND c.name_key = ?2
            {CHECKPOINT_ORDER}
            LIMIT 1
            "#
        ),
        params![project_id.get(), name_lookup_key(name)],
    )?;
    Ok(found.into_iter().next())
}
