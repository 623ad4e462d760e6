//! Second-stage retrieval: ask an external oracle to pick an entry.
//!
//! The oracle sees a numbered listing of the whole catalog and is expected
//! to answer with one number or `none`. Its reply is free text, so parsing
//! is total and never trusts the reply's shape.

use std::sync::LazyLock;

use faqdesk_shared::FaqEntry;
use regex::Regex;
use serde::Serialize;

/// Characters of each answer included in the listing.
pub const SNIPPET_CHARS: usize = 200;

/// Maximum reply tokens; a number or `none` fits easily.
pub const DEFAULT_MAX_TOKENS: u32 = 10;

pub const SYSTEM_PROMPT: &str = "You are an FAQ assistant. Pick the single most relevant FAQ \
from the list. Reply ONLY with the number. If nothing fits, reply 'none'.";

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A single ranking request: instruction, prompt and reply token limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl RankingRequest {
    pub fn new(query: &str, entries: &[FaqEntry], max_tokens: u32) -> Self {
        let listing = build_listing(entries);
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "User question: \"{query}\"\n\nFAQs:\n{listing}\n\n\
                 Which FAQ best matches? Reply with the number or 'none'."
            ),
            max_tokens,
        }
    }
}

/// Numbered catalog listing, entries separated by a blank line.
pub fn build_listing(entries: &[FaqEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{}. Q: {}\n   A (snippet): {}",
                i + 1,
                entry.question,
                snippet(&entry.answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Leading characters of an answer on one line, `...` if cut.
pub fn snippet(answer: &str) -> String {
    let mut out: String = answer
        .chars()
        .take(SNIPPET_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if answer.chars().nth(SNIPPET_CHARS).is_some() {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Interpretation of an oracle reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingReply {
    /// Zero-based catalog index.
    Pick(usize),
    /// The oracle said nothing fits.
    NoMatch,
    /// No usable number: missing, zero, out of range, or too large.
    Unparsable,
}

impl RankingReply {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Pick(idx) => Some(idx),
            Self::NoMatch | Self::Unparsable => None,
        }
    }
}

/// Parse a reply against a catalog of `catalog_len` entries.
///
/// The first run of digits is read as a 1-based index. Only when the reply
/// has no digits at all does the word `none` count as an explicit no-match.
pub fn parse_reply(reply: &str, catalog_len: usize) -> RankingReply {
    let normalized = reply.trim().to_lowercase();

    let Some(digits) = DIGITS_RE.find(&normalized) else {
        return if normalized.contains("none") {
            RankingReply::NoMatch
        } else {
            RankingReply::Unparsable
        };
    };

    match digits.as_str().parse::<usize>() {
        Ok(n) if (1..=catalog_len).contains(&n) => RankingReply::Pick(n - 1),
        _ => RankingReply::Unparsable,
    }
}
