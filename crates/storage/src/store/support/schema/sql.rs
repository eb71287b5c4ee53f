#![forbid(unsafe_code)]

pub(super) const PRAGMAS: &str = r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
"#;

const CORE: &str = r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          owner TEXT NOT NULL,
          name TEXT NOT NULL,
          active INTEGER NOT NULL DEFAULT 1 CHECK(active IN (0, 1)),
          attrs_json TEXT NOT NULL DEFAULT '{}',
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;

const BRANCHES: &str = r#"
        CREATE TABLE IF NOT EXISTS branches (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          project_id INTEGER NOT NULL,
          state_json TEXT NOT NULL DEFAULT '{}',
          is_current INTEGER NOT NULL DEFAULT 0 CHECK(is_current IN (0, 1)),
          checkpoint_count INTEGER NOT NULL DEFAULT 0 CHECK(checkpoint_count >= 0),
          -- Numbers automatic checkpoint labels; never decremented.
          capture_seq INTEGER NOT NULL DEFAULT 0 CHECK(capture_seq >= 0),
          -- Not a foreign key: the seed checkpoint may be deleted later.
          forked_from INTEGER,
          attrs_json TEXT NOT NULL DEFAULT '{}',
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
        );

        -- At most one current branch per project.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_branches_one_current
          ON branches(project_id) WHERE is_current = 1;

        CREATE TABLE IF NOT EXISTS turns (
          branch_id INTEGER NOT NULL,
          seq INTEGER NOT NULL,
          role TEXT NOT NULL,
          content TEXT NOT NULL,
          meta_json TEXT NOT NULL DEFAULT '{}',
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY(branch_id, seq),
          FOREIGN KEY(branch_id) REFERENCES branches(id) ON DELETE CASCADE
        );

        CREATE TRIGGER IF NOT EXISTS trg_turns_append_only
          BEFORE UPDATE ON turns
        BEGIN
          SELECT RAISE(ABORT, 'turns are append-only');
        END;
"#;

const CHECKPOINTS: &str = r#"
        CREATE TABLE IF NOT EXISTS checkpoints (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          branch_id INTEGER NOT NULL,
          name TEXT NOT NULL,
          name_key TEXT NOT NULL,
          state_json TEXT NOT NULL,
          turns_json TEXT NOT NULL,
          automatic INTEGER NOT NULL CHECK(automatic IN (0, 1)),
          attrs_json TEXT NOT NULL DEFAULT '{}',
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(branch_id) REFERENCES branches(id) ON DELETE CASCADE
        );

        CREATE TRIGGER IF NOT EXISTS trg_checkpoints_immutable
          BEFORE UPDATE ON checkpoints
        BEGIN
          SELECT RAISE(ABORT, 'checkpoint is immutable');
        END;
"#;

const INDEXES: &str = r#"
        CREATE INDEX IF NOT EXISTS idx_projects_owner_created
          ON projects(owner, created_at_ms, id);

        CREATE INDEX IF NOT EXISTS idx_branches_project_created
          ON branches(project_id, created_at_ms, id);

        CREATE INDEX IF NOT EXISTS idx_checkpoints_branch_created
          ON checkpoints(branch_id, created_at_ms DESC, id DESC);

        CREATE INDEX IF NOT EXISTS idx_checkpoints_branch_name
          ON checkpoints(branch_id, name_key);
"#;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(CORE);
    sql.push_str(BRANCHES);
    sql.push_str(CHECKPOINTS);
    sql.push_str(INDEXES);
    sql
}
