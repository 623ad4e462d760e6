//! Remote query log: one inserted table row per resolved query.

use faqdesk_shared::{FaqDeskError, QueryLogConfig, QueryLogRecord, Result};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::client::TableClient;

/// Column ids of the log table, one per record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogColumns {
    pub user: String,
    pub question: String,
    pub timestamp: String,
    pub matched: String,
    pub matched_question: String,
}

impl From<&QueryLogConfig> for LogColumns {
    fn from(config: &QueryLogConfig) -> Self {
        Self {
            user: config.user_column.clone(),
            question: config.question_column.clone(),
            timestamp: config.timestamp_column.clone(),
            matched: config.matched_column.clone(),
            matched_question: config.matched_question_column.clone(),
        }
    }
}

/// Appends query records to a table through the table API.
#[derive(Debug, Clone)]
pub struct TableLogSink {
    client: TableClient,
    doc_id: String,
    table_id: String,
    columns: LogColumns,
}

impl TableLogSink {
    pub fn new(
        client: TableClient,
        doc_id: impl Into<String>,
        table_id: impl Into<String>,
        columns: LogColumns,
    ) -> Self {
        Self {
            client,
            doc_id: doc_id.into(),
            table_id: table_id.into(),
            columns,
        }
    }

    /// Build a sink from the `[query_log]` section. The section must be
    /// complete for the `table` sink.
    pub fn from_config(client: TableClient, config: &QueryLogConfig) -> Result<Self> {
        config.validate()?;
        if config.doc_id.is_empty() {
            return Err(FaqDeskError::config("query_log.doc_id is empty"));
        }
        Ok(Self::new(
            client,
            &config.doc_id,
            &config.table_id,
            LogColumns::from(config),
        ))
    }

    #[instrument(skip_all, fields(table = %self.table_id, matched = %record.matched_id))]
    pub async fn append(&self, record: &QueryLogRecord) -> Result<()> {
        let body = row_body(record, &self.columns);
        self.client
            .insert_rows(&self.doc_id, &self.table_id, &body)
            .await?;
        debug!("query logged to table");
        Ok(())
    }
}

fn row_body(record: &QueryLogRecord, columns: &LogColumns) -> Value {
    json!({
        "rows": [{
            "cells": [
                {"column": columns.user, "value": record.user},
                {"column": columns.question, "value": record.question},
                {"column": columns.timestamp, "value": record.timestamp.to_rfc3339()},
                {"column": columns.matched, "value": record.matched_id},
                {"column": columns.matched_question, "value": record.matched_question},
            ]
        }]
    })
}
