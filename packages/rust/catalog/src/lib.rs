//! Table-backed FAQ catalog.
//!
//! The FAQ lives in a hosted table whose API reports cells by opaque
//! column id. [`TableCatalog`] resolves the id to name map once per client,
//! then turns each row into a [`FaqEntry`] with a rendered answer. The same
//! API also receives query log rows through [`TableLogSink`].

mod client;
mod rows;
mod sink;

use faqdesk_shared::{CatalogConfig, FaqDeskError, FaqEntry, Result};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

pub use client::{TableClient, TableColumn, TableRow};
pub use rows::{ColumnMap, DumpedRow, FaqColumns, NO_ANSWER, render_answer, row_to_entry};
pub use sink::{LogColumns, TableLogSink};

/// Characters of each answer shown in load diagnostics.
const PREVIEW_CHARS: usize = 100;

/// One FAQ table, with its column map cached after the first load.
#[derive(Debug)]
pub struct TableCatalog {
    client: TableClient,
    doc_id: String,
    table_id: String,
    columns: FaqColumns,
    column_map: OnceCell<ColumnMap>,
}

impl TableCatalog {
    pub fn new(
        client: TableClient,
        doc_id: impl Into<String>,
        table_id: impl Into<String>,
        columns: FaqColumns,
    ) -> Self {
        Self {
            client,
            doc_id: doc_id.into(),
            table_id: table_id.into(),
            columns,
            column_map: OnceCell::new(),
        }
    }

    /// Build a catalog from the `[catalog]` section.
    pub fn from_config(client: TableClient, config: &CatalogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            client,
            &config.doc_id,
            &config.table_id,
            FaqColumns::from(config),
        ))
    }

    /// Column id to name map, fetched on first use.
    pub async fn column_map(&self) -> Result<&ColumnMap> {
        self.column_map
            .get_or_try_init(|| async {
                let map: ColumnMap = self
                    .client
                    .list_columns(&self.doc_id, &self.table_id)
                    .await?
                    .into_iter()
                    .collect();
                info!(columns = map.len(), "column map loaded");
                Ok::<_, FaqDeskError>(map)
            })
            .await
    }

    /// Fetch every row and convert it to an entry, in table order.
    #[instrument(skip_all, fields(doc = %self.doc_id, table = %self.table_id))]
    pub async fn load_entries(&self) -> Result<Vec<FaqEntry>> {
        let columns = self.column_map().await?;
        let table_rows = self.client.list_rows(&self.doc_id, &self.table_id).await?;

        let entries: Vec<FaqEntry> = table_rows
            .iter()
            .map(|row| row_to_entry(row, columns, &self.columns))
            .collect();

        for entry in &entries {
            debug!(
                question = %entry.question,
                answer = %rows::preview(&entry.answer, PREVIEW_CHARS),
                link = entry.link.as_deref().unwrap_or("[No link]"),
                "loaded entry"
            );
        }
        info!(entries = entries.len(), "catalog loaded");

        Ok(entries)
    }

    /// Every row with column names in place of ids and raw cell values.
    #[instrument(skip_all, fields(doc = %self.doc_id, table = %self.table_id))]
    pub async fn dump_rows(&self) -> Result<Vec<DumpedRow>> {
        let columns = self.column_map().await?;
        let table_rows = self.client.list_rows(&self.doc_id, &self.table_id).await?;
        Ok(table_rows
            .iter()
            .map(|row| DumpedRow::from_row(row, columns))
            .collect())
    }

    /// Name of the answer column, used to pick raw answer cells from dumps.
    pub fn answer_column(&self) -> &str {
        &self.columns.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_table(server: &MockServer, columns_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/docs/d/tables/faq/columns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "c-q", "name": "Question"},
                    {"id": "c-a", "name": "Next Step"},
                    {"id": "c-l", "name": "Link"}
                ]
            })))
            .expect(columns_calls)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/docs/d/tables/faq/rows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "r1", "values": {
                        "c-q": "How do I export data?",
                        "c-a": "Open reports\nClick export",
                        "c-l": "https://faq.test/export"
                    }},
                    {"id": "r2", "values": {"c-q": "Who approves refunds?"}}
                ]
            })))
            .mount(server)
            .await;
    }

    fn catalog(server: &MockServer) -> TableCatalog {
        let client = TableClient::new(&server.uri(), "k", 5).unwrap();
        TableCatalog::new(client, "d", "faq", FaqColumns::default())
    }

    #[tokio::test]
    async fn load_entries_converts_rows_in_order() {
        let server = MockServer::start().await;
        mock_table(&server, 1).await;

        let entries = catalog(&server).load_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "How do I export data?");
        assert_eq!(entries[0].answer, "1. Open reports\n2. Click export");
        assert_eq!(entries[1].answer, NO_ANSWER);
        assert_eq!(entries[1].link, None);
    }

    #[tokio::test]
    async fn column_map_is_fetched_once() {
        let server = MockServer::start().await;
        mock_table(&server, 1).await;

        let catalog = catalog(&server);
        catalog.load_entries().await.unwrap();
        catalog.load_entries().await.unwrap();
        catalog.dump_rows().await.unwrap();
    }

    #[tokio::test]
    async fn dump_uses_column_names() {
        let server = MockServer::start().await;
        mock_table(&server, 1).await;

        let catalog = catalog(&server);
        let dump = catalog.dump_rows().await.unwrap();
        assert_eq!(dump[0].row_id, "r1");
        assert_eq!(
            dump[0].values[catalog.answer_column()],
            "Open reports\nClick export"
        );
    }

    #[test]
    fn from_config_requires_table_coordinates() {
        let client = TableClient::new("https://coda.io/apis/v1", "k", 5).unwrap();
        assert!(TableCatalog::from_config(client, &CatalogConfig::default()).is_err());
    }
}
