//! Two-stage retrieval: keyword overlap, then the ranking oracle.

use faqdesk_shared::{FaqEntry, MatchSource, Result, RetrievalResult};
use tracing::{debug, info, instrument, warn};

use crate::fallback::{DEFAULT_MAX_TOKENS, RankingReply, RankingRequest, parse_reply};
use crate::keyword::keyword_match;
use crate::oracle::RankingOracle;

/// Resolves queries against a catalog.
#[derive(Debug, Clone)]
pub struct RetrievalEngine<O> {
    oracle: O,
    max_tokens: u32,
}

impl<O> RetrievalEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: RankingOracle> RetrievalEngine<O> {
    /// Find the entry answering `query`, if any.
    ///
    /// Oracle transport failures are returned as errors; an oracle reply
    /// that names no valid entry is a plain `None`.
    #[instrument(skip_all, fields(query = %query, entries = entries.len()))]
    pub async fn resolve(
        &self,
        query: &str,
        entries: &[FaqEntry],
    ) -> Result<Option<RetrievalResult>> {
        if entries.is_empty() {
            debug!("empty catalog, nothing to match");
            return Ok(None);
        }

        if let Some(hit) = keyword_match(query, entries) {
            info!(index = hit.index, score = hit.score, "keyword match");
            return Ok(Some(RetrievalResult {
                entry: entries[hit.index].clone(),
                source: MatchSource::Exact,
            }));
        }

        let request = RankingRequest::new(query, entries, self.max_tokens);
        let reply = self.oracle.rank(&request).await?;

        match parse_reply(&reply, entries.len()) {
            RankingReply::Pick(index) => {
                info!(index, "oracle match");
                Ok(Some(RetrievalResult {
                    entry: entries[index].clone(),
                    source: MatchSource::Fallback,
                }))
            }
            RankingReply::NoMatch => {
                info!("oracle found no match");
                Ok(None)
            }
            RankingReply::Unparsable => {
                warn!(%reply, "oracle reply names no entry");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use faqdesk_shared::{FaqDeskError, Result};

    use crate::fallback::RankingRequest;
    use crate::oracle::RankingOracle;

    /// Oracle returning a canned reply and recording requests.
    #[derive(Debug, Default)]
    pub struct ScriptedOracle {
        pub reply: Option<String>,
        pub requests: Mutex<Vec<RankingRequest>>,
    }

    impl ScriptedOracle {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                requests: Mutex::default(),
            }
        }

        /// An oracle whose every call fails.
        pub fn failing() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl RankingOracle for ScriptedOracle {
        async fn rank(&self, request: &RankingRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| FaqDeskError::Oracle("connection refused".into()))
        }
    }
}
