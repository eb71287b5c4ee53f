#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use fp_core::clock::now_ms;
use rusqlite::{Connection, OptionalExtension, params};

const SCHEMA_VERSION: i64 = 2;

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(sql::PRAGMAS)?;
    preflight_gate(conn)?;
    conn.execute_batch(&sql::full_schema_sql())?;

    conn.execute(
        r#"
        INSERT INTO meta(key, value) VALUES ('schema_version', ?1)
        ON CONFLICT(key) DO NOTHING
        "#,
        params![SCHEMA_VERSION.to_string()],
    )?;
    conn.execute(
        r#"
        INSERT INTO meta(key, value) VALUES ('created_at_ms', ?1)
        ON CONFLICT(key) DO NOTHING
        "#,
        params![now_ms().to_string()],
    )?;
    Ok(())
}

/// Refuses databases written by a different schema version instead of guessing a migration.
fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let has_meta = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !has_meta {
        return Ok(());
    }

    let version = conn
        .query_row(
            "SELECT value FROM meta WHERE key='schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    match version.as_deref().map(str::parse::<i64>) {
        None => Ok(()),
        Some(Ok(v)) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
    }
}
