//! Text-generation seams and an OpenAI-compatible implementation.
//!
//! The same chat-completions endpoint serves two purposes: ranking the
//! catalog when keyword matching fails ([`RankingOracle`]) and rewriting a
//! matched answer for chat ([`AnswerWriter`]).

use std::future::Future;
use std::time::Duration;

use faqdesk_shared::{FaqDeskError, OracleConfig, Result};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::fallback::RankingRequest;
use crate::rewrite::RewriteRequest;

/// External service that answers a ranking request with free text.
pub trait RankingOracle: Send + Sync {
    fn rank(&self, request: &RankingRequest) -> impl Future<Output = Result<String>> + Send;
}

/// External service that rewrites an FAQ answer in conversational form.
pub trait AnswerWriter: Send + Sync {
    fn rewrite(&self, request: &RewriteRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Chat-completions client (`POST {base}/chat/completions`).
#[derive(Debug, Clone)]
pub struct ChatCompletionsOracle {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsOracle {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FaqDeskError::Oracle(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self> {
        Self::new(&config.base_url, api_key, &config.model, config.timeout_secs)
    }

    fn request_body(&self, system: &str, user: &str, max_tokens: u32) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": max_tokens,
        })
    }

    /// One system + user exchange; returns the first choice's content.
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, user, max_tokens))
            .send()
            .await
            .map_err(|e| FaqDeskError::Oracle(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FaqDeskError::Oracle(format!("HTTP {status}: {text}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FaqDeskError::Oracle(format!("invalid JSON reply: {e}")))?;

        let content = body["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| FaqDeskError::Oracle("no message content in reply".into()))?;

        debug!(reply = %content, "model replied");
        Ok(content.to_string())
    }
}

impl RankingOracle for ChatCompletionsOracle {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn rank(&self, request: &RankingRequest) -> Result<String> {
        self.complete(&request.system, &request.user, request.max_tokens)
            .await
    }
}

impl AnswerWriter for ChatCompletionsOracle {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
        self.complete(&request.system, &request.user, request.max_tokens)
            .await
    }
}
