//! Conversational rewrite of a matched answer.
//!
//! The matched FAQ answer is handed to a text-generation model as knowledge,
//! together with the user's question. The model's text is then reshaped into
//! a [`ChatReply`] by the deterministic chat formatter.

use faqdesk_render::ChatReply;
use faqdesk_shared::{FaqEntry, Result};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::oracle::AnswerWriter;

/// Maximum tokens of a rewritten answer.
pub const DEFAULT_REWRITE_MAX_TOKENS: u32 = 300;

/// Closing line used when none is configured.
pub const DEFAULT_OUTRO: &str = "Hope that helps!";

pub const REWRITE_SYSTEM_PROMPT: &str = "\
You are a friendly, professional support agent.
Use the FAQ content you are given as your knowledge, but do not copy it word for word.
Answer in short conversational paragraphs, not lists or bullet points.

Guidelines:
- Keep the tone natural and approachable.
- Skip filler and exaggerated empathy.
- Answer directly; keep it concise and actionable.
- Include conditional instructions when the FAQ has them.
- If the steps may not fully resolve the issue, suggest contacting the support team.

Always end with a clear next step.";

/// A single rewrite request for the text-generation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl RewriteRequest {
    pub fn new(query: &str, entry: &FaqEntry, max_tokens: u32) -> Self {
        Self {
            system: REWRITE_SYSTEM_PROMPT.to_string(),
            user: format!(
                "User question: \"{query}\"\nFAQ answer (knowledge base): {}",
                entry.answer
            ),
            max_tokens,
        }
    }
}

/// Turns a matched entry into a chat reply through an [`AnswerWriter`].
#[derive(Debug, Clone)]
pub struct ReplyWriter<W> {
    writer: W,
    max_tokens: u32,
    outro: String,
}

impl<W> ReplyWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            max_tokens: DEFAULT_REWRITE_MAX_TOKENS,
            outro: DEFAULT_OUTRO.to_string(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_outro(mut self, outro: impl Into<String>) -> Self {
        self.outro = outro.into();
        self
    }
}

impl<W: AnswerWriter> ReplyWriter<W> {
    /// Rewrite `entry`'s answer for `query`. Writer failures propagate.
    #[instrument(skip_all, fields(question = %entry.question))]
    pub async fn write(&self, query: &str, entry: &FaqEntry) -> Result<ChatReply> {
        let request = RewriteRequest::new(query, entry, self.max_tokens);
        let rewritten = self.writer.rewrite(&request).await?;

        let reply = ChatReply::new(
            &rewritten,
            &self.outro,
            entry.link.as_deref(),
            &entry.question,
        );
        debug!(paragraphs = reply.paragraphs.len(), "answer rewritten");
        Ok(reply)
    }
}
