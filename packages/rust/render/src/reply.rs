//! Chat formatting for rewritten answers.
//!
//! A rewritten answer is free text from a text-generation model. It is
//! reshaped into short chat paragraphs: list markers are dropped, `**bold**`
//! becomes chat-style `*bold*`, and every remaining line becomes its own
//! paragraph. The reply closes with an italic outro and, when the entry has
//! one, a pointer to the full FAQ.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s+").expect("valid regex"));
static DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- ").expect("valid regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Split rewritten text into chat paragraphs.
pub fn format_reply(text: &str) -> Vec<String> {
    let text = NUMBERING_RE.replace_all(text.trim(), "");
    let text = DASH_RE.replace_all(&text, "");
    let text = BOLD_RE.replace_all(&text, "*$1*");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A chat-ready reply: paragraphs, outro and optional FAQ pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub paragraphs: Vec<String>,
    pub outro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl ChatReply {
    /// Build a reply from rewritten text. `link` and `question` identify the
    /// FAQ entry the answer came from.
    pub fn new(rewritten: &str, outro: &str, link: Option<&str>, question: &str) -> Self {
        Self {
            paragraphs: format_reply(rewritten),
            outro: format!("_{}_", outro.trim()),
            footer: link.filter(|l| !l.is_empty()).map(|link| {
                format!(":link: To view the full FAQ and related links, open this: <{link}|{question}>")
            }),
        }
    }

    /// Message blocks in display order.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.outro.as_str()))
            .chain(self.footer.as_deref())
    }
}

impl fmt::Display for ChatReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            f.write_str(block)?;
        }
        Ok(())
    }
}
