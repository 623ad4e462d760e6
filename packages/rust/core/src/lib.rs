//! Retrieval core for faqdesk.
//!
//! Queries are resolved in two stages: keyword overlap against catalog
//! questions ([`keyword`]), then an external ranking oracle over a numbered
//! listing of the catalog ([`fallback`], [`oracle`]). [`FaqService`] adds
//! catalog refresh through read-mostly snapshots and query logging.
//! [`ReplyWriter`] optionally rewrites a matched answer for chat.

pub mod engine;
pub mod fallback;
pub mod keyword;
pub mod oracle;
pub mod rewrite;
pub mod service;
pub mod snapshot;

pub use engine::RetrievalEngine;
pub use fallback::{RankingReply, RankingRequest, build_listing, parse_reply};
pub use keyword::{KeywordMatch, keyword_match, tokenize};
pub use oracle::{AnswerWriter, ChatCompletionsOracle, RankingOracle};
pub use rewrite::{ReplyWriter, RewriteRequest};
pub use service::{Answer, CatalogSource, FaqService, QueryLog, QueryLogSink, normalize_query};
pub use snapshot::{CatalogSnapshot, SharedCatalog};
