//! libSQL storage for the local query log.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one row per
//! resolved query.
//!
//! **Access rules:**
//! - the `ask` path: read-write via [`Storage::open`]
//! - inspection commands: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use faqdesk_shared::{FaqDeskError, QueryLogRecord, Result};
use libsql::{Connection, Database, params};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// A query log row as stored locally.
#[derive(Debug, Clone, Serialize)]
pub struct StoredQuery {
    pub id: String,
    #[serde(flatten)]
    pub record: QueryLogRecord,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FaqDeskError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FaqDeskError::Storage(format!(
                "query log not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        FaqDeskError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(FaqDeskError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query log
    // -----------------------------------------------------------------------

    /// Append one record. Returns the new row id.
    pub async fn record_query(&self, record: &QueryLogRecord) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        self.conn
            .execute(
                "INSERT INTO query_log (id, user_name, question, asked_at, matched_id, matched_question)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    record.user.as_str(),
                    record.question.as_str(),
                    record.timestamp.to_rfc3339(),
                    record.matched_id.as_str(),
                    record.matched_question.as_str(),
                ],
            )
            .await
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        debug!(%id, matched = %record.matched_id, "query recorded");
        Ok(id)
    }

    /// Most recent records first, at most `limit`.
    pub async fn recent_queries(&self, limit: usize) -> Result<Vec<StoredQuery>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_name, question, asked_at, matched_id, matched_question
                 FROM query_log ORDER BY asked_at DESC, id DESC LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_stored_query(&row)?);
        }
        Ok(results)
    }

    /// Total number of records.
    pub async fn query_count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM query_log", params![])
            .await
            .map_err(|e| FaqDeskError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n.max(0) as u64)
                .map_err(|e| FaqDeskError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(FaqDeskError::Storage(e.to_string())),
        }
    }
}

fn row_to_stored_query(row: &libsql::Row) -> Result<StoredQuery> {
    let get = |idx: i32| {
        row.get::<String>(idx)
            .map_err(|e| FaqDeskError::Storage(e.to_string()))
    };

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&get(3)?)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FaqDeskError::Storage(format!("invalid date: {e}")))?;

    Ok(StoredQuery {
        id: get(0)?,
        record: QueryLogRecord {
            user: get(1)?,
            question: get(2)?,
            timestamp,
            matched_id: get(4)?,
            matched_question: get(5)?,
        },
    })
}
