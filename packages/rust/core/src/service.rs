//! Query service: catalog refresh, retrieval, and query logging.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use faqdesk_catalog::{TableCatalog, TableLogSink};
use faqdesk_shared::{FaqEntry, QueryLogRecord, Result, RetrievalResult};
use faqdesk_storage::Storage;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::engine::RetrievalEngine;
use crate::oracle::RankingOracle;
use crate::snapshot::{CatalogSnapshot, SharedCatalog};

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@[^>]+>").expect("valid regex"));

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Where catalog entries come from.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Vec<FaqEntry>>> + Send;
}

/// Where resolved queries are recorded.
pub trait QueryLogSink: Send + Sync {
    fn record(&self, record: &QueryLogRecord) -> impl Future<Output = Result<()>> + Send;
}

impl CatalogSource for TableCatalog {
    async fn load(&self) -> Result<Vec<FaqEntry>> {
        self.load_entries().await
    }
}

impl QueryLogSink for TableLogSink {
    async fn record(&self, record: &QueryLogRecord) -> Result<()> {
        self.append(record).await
    }
}

impl QueryLogSink for Storage {
    async fn record(&self, record: &QueryLogRecord) -> Result<()> {
        self.record_query(record).await.map(|_| ())
    }
}

/// Runtime choice of query log sink.
pub enum QueryLog {
    Local(Storage),
    Table(TableLogSink),
    Disabled,
}

impl QueryLogSink for QueryLog {
    async fn record(&self, record: &QueryLogRecord) -> Result<()> {
        match self {
            Self::Local(storage) => storage.record(record).await,
            Self::Table(sink) => sink.record(record).await,
            Self::Disabled => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Outcome of one question.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The query as resolved, after normalization.
    pub query: String,
    pub result: Option<RetrievalResult>,
}

/// Remove the first chat mention token (`<@U123>`) and trim.
pub fn normalize_query(raw: &str) -> String {
    MENTION_RE.replace(raw, "").trim().to_string()
}

/// Wires a catalog source, the retrieval engine and a query log sink.
pub struct FaqService<S, O, L> {
    source: S,
    engine: RetrievalEngine<O>,
    sink: L,
    catalog: SharedCatalog,
    refresh_each_query: bool,
    loaded: AtomicBool,
}

impl<S, O, L> FaqService<S, O, L>
where
    S: CatalogSource,
    O: RankingOracle,
    L: QueryLogSink,
{
    pub fn new(source: S, engine: RetrievalEngine<O>, sink: L) -> Self {
        Self {
            source,
            engine,
            sink,
            catalog: SharedCatalog::default(),
            refresh_each_query: true,
            loaded: AtomicBool::new(false),
        }
    }

    /// With `false`, the catalog is loaded on first use and then kept until
    /// [`refresh`](Self::refresh) is called.
    pub fn refresh_each_query(mut self, enabled: bool) -> Self {
        self.refresh_each_query = enabled;
        self
    }

    /// The snapshot currently in effect.
    pub fn catalog(&self) -> Arc<CatalogSnapshot> {
        self.catalog.snapshot()
    }

    /// Load the catalog and swap it in.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<Arc<CatalogSnapshot>> {
        let snapshot = Arc::new(CatalogSnapshot::new(self.source.load().await?));

        let previous = self.catalog.replace(Arc::clone(&snapshot));
        self.loaded.store(true, Ordering::Release);

        let entries = snapshot.len();
        if previous.fingerprint() == snapshot.fingerprint() {
            debug!(entries, "catalog unchanged");
        } else {
            info!(entries, fingerprint = %snapshot.fingerprint(), "catalog refreshed");
        }
        Ok(snapshot)
    }

    /// Snapshot to answer from: refreshed per policy. A failed refresh
    /// falls back to the previous snapshot once one has been loaded.
    async fn current_catalog(&self) -> Result<Arc<CatalogSnapshot>> {
        let loaded = self.loaded.load(Ordering::Acquire);
        if loaded && !self.refresh_each_query {
            return Ok(self.catalog.snapshot());
        }

        match self.refresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if loaded => {
                warn!(error = %e, "catalog refresh failed, using previous snapshot");
                Ok(self.catalog.snapshot())
            }
            Err(e) => Err(e),
        }
    }

    /// Answer one raw question from `user` and record it.
    #[instrument(skip_all, fields(user = %user))]
    pub async fn ask(&self, raw_query: &str, user: &str) -> Result<Answer> {
        let query = normalize_query(raw_query);

        let result = if query.is_empty() {
            debug!("empty query after normalization");
            None
        } else {
            let catalog = self.current_catalog().await?;
            self.engine.resolve(&query, catalog.entries()).await?
        };

        let record = QueryLogRecord::new(user, &query, result.as_ref());
        if let Err(e) = self.sink.record(&record).await {
            warn!(error = %e, "failed to record query");
        }

        Ok(Answer { query, result })
    }
}
