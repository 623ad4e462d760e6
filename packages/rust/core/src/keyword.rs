//! First-stage retrieval: keyword overlap between query and questions.

use std::collections::HashSet;
use std::sync::LazyLock;

use faqdesk_shared::FaqEntry;
use regex::Regex;

/// Runs of non-word characters separate tokens.
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// Best keyword match: catalog index and overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch {
    pub index: usize,
    pub score: usize,
}

/// Lowercase `text` and split it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    NON_WORD_RE
        .split(&lower)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of query tokens, repeats included, found in `question`.
pub fn overlap_score(query_tokens: &[String], question: &str) -> usize {
    let question_tokens: HashSet<String> = tokenize(question).into_iter().collect();
    query_tokens
        .iter()
        .filter(|t| question_tokens.contains(*t))
        .count()
}

/// Highest-scoring entry, or `None` when nothing overlaps.
///
/// Entries are scanned in catalog order and the best is replaced only on
/// a strictly greater score, so ties keep the earliest entry. Entries with
/// an empty question are skipped.
pub fn keyword_match(query: &str, entries: &[FaqEntry]) -> Option<KeywordMatch> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return None;
    }

    let mut best: Option<KeywordMatch> = None;
    for (index, entry) in entries.iter().enumerate() {
        if entry.question.is_empty() {
            continue;
        }
        let score = overlap_score(&query_tokens, &entry.question);
        if score > best.map_or(0, |b| b.score) {
            best = Some(KeywordMatch { index, score });
        }
    }
    best
}
