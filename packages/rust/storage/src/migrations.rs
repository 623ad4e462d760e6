//! SQL migration definitions for the query log database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: query_log",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per resolved query
CREATE TABLE IF NOT EXISTS query_log (
    id               TEXT PRIMARY KEY,
    user_name        TEXT NOT NULL,
    question         TEXT NOT NULL,
    asked_at         TEXT NOT NULL,
    matched_id       TEXT NOT NULL,
    matched_question TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_query_log_asked_at ON query_log(asked_at);
CREATE INDEX IF NOT EXISTS idx_query_log_matched ON query_log(matched_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
