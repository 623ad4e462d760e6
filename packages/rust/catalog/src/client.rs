//! Minimal HTTP client for the table API.
//!
//! Covers the three calls faqdesk needs: list columns, list rows, and
//! insert rows. List endpoints are paginated through `nextPageToken`.

use std::time::Duration;

use faqdesk_shared::{FaqDeskError, Result};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// User-Agent string for table API requests.
const USER_AGENT: &str = concat!("faqdesk/", env!("CARGO_PKG_VERSION"));

/// Upper bound on pages followed for one listing.
const MAX_PAGES: usize = 100;

/// A column as reported by the table API.
#[derive(Debug, Clone, Deserialize)]
pub struct TableColumn {
    pub id: String,
    pub name: String,
}

/// A row as reported by the table API: cell values keyed by column id.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub values: serde_json::Map<String, Value>,
}

/// One page of a listing endpoint.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    items: Option<Value>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

/// Authenticated client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct TableClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl TableClient {
    /// Build a client with bearer `token` and a request timeout.
    pub fn new(base_url: &str, token: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            FaqDeskError::validation(format!("invalid table API base URL {base_url}: {e}"))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FaqDeskError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// `GET /docs/{doc}/tables/{table}/columns`, all pages.
    pub async fn list_columns(&self, doc_id: &str, table_id: &str) -> Result<Vec<TableColumn>> {
        let url = self.endpoint(doc_id, table_id, "columns")?;
        self.list_all(url).await
    }

    /// `GET /docs/{doc}/tables/{table}/rows`, all pages.
    pub async fn list_rows(&self, doc_id: &str, table_id: &str) -> Result<Vec<TableRow>> {
        let url = self.endpoint(doc_id, table_id, "rows")?;
        self.list_all(url).await
    }

    /// `POST /docs/{doc}/tables/{table}/rows` with a prepared body.
    pub async fn insert_rows(&self, doc_id: &str, table_id: &str, body: &Value) -> Result<()> {
        let url = self.endpoint(doc_id, table_id, "rows")?;
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| FaqDeskError::Network(format!("{url}: {e}")))?;

        check_status(&url, response).await?;
        Ok(())
    }

    fn endpoint(&self, doc_id: &str, table_id: &str, leaf: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FaqDeskError::validation(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["docs", doc_id, "tables", table_id, leaf]);
        Ok(url)
    }

    async fn list_all<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut url = first.clone();

        for page_no in 1..=MAX_PAGES {
            let page: Page = self.get_json(&url).await?;

            match page.items {
                Some(items @ Value::Array(_)) => {
                    let batch: Vec<T> = serde_json::from_value(items).map_err(|e| {
                        FaqDeskError::parse(format!("{url}: unexpected item shape: {e}"))
                    })?;
                    debug!(page = page_no, items = batch.len(), "fetched page");
                    out.extend(batch);
                }
                _ => {
                    warn!(%url, "response has no item list, treating as empty");
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => {
                    url = first.clone();
                    url.query_pairs_mut().append_pair("pageToken", &token);
                }
                None => return Ok(out),
            }
        }

        warn!(%first, max_pages = MAX_PAGES, "page limit reached, listing truncated");
        Ok(out)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| FaqDeskError::Network(format!("{url}: {e}")))?;

        let response = check_status(url, response).await?;
        response
            .json()
            .await
            .map_err(|e| FaqDeskError::parse(format!("{url}: invalid JSON body: {e}")))
    }
}

async fn check_status(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FaqDeskError::Network(format!(
        "{url}: HTTP {status}: {}",
        body.chars().take(200).collect::<String>()
    )))
}
