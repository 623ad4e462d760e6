//! Core domain types for faqdesk catalogs and query results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier logged when a query matched nothing, or matched an entry
/// without an external link.
pub const NO_MATCH_ID: &str = "N/A";

// ---------------------------------------------------------------------------
// FaqEntry
// ---------------------------------------------------------------------------

/// One question/answer record of the catalog.
///
/// The answer is already rendered to flat text (step list or formatted
/// document tree) when the entry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question text matched against queries.
    pub question: String,
    /// Rendered answer text.
    pub answer: String,
    /// Optional link to the full FAQ page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FaqEntry {
    /// Build an entry from its three fields.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            link,
        }
    }

    /// Identifier recorded in the query log: the entry link, or `N/A`.
    pub fn log_id(&self) -> &str {
        self.link
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(NO_MATCH_ID)
    }
}

// ---------------------------------------------------------------------------
// RetrievalResult
// ---------------------------------------------------------------------------

/// Which retrieval stage produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Deterministic keyword overlap.
    Exact,
    /// External ranking oracle.
    Fallback,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matched catalog entry and the stage that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub entry: FaqEntry,
    pub source: MatchSource,
}

// ---------------------------------------------------------------------------
// QueryLogRecord
// ---------------------------------------------------------------------------

/// One row written to the query log after a query is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogRecord {
    /// Display name of the asking user.
    pub user: String,
    /// Normalized query text.
    pub question: String,
    /// When the query was resolved.
    pub timestamp: DateTime<Utc>,
    /// Matched entry link, or `N/A`.
    pub matched_id: String,
    /// Matched question text (empty when nothing matched).
    pub matched_question: String,
}

impl QueryLogRecord {
    /// Build a record for `question` from an optional retrieval result.
    pub fn new(
        user: impl Into<String>,
        question: impl Into<String>,
        result: Option<&RetrievalResult>,
    ) -> Self {
        let (matched_id, matched_question) = match result {
            Some(r) => (r.entry.log_id().to_string(), r.entry.question.clone()),
            None => (NO_MATCH_ID.to_string(), String::new()),
        };

        Self {
            user: user.into(),
            question: question.into(),
            timestamp: Utc::now(),
            matched_id,
            matched_question,
        }
    }
}
