//! Application configuration for faqdesk.
//!
//! User config lives at `~/.faqdesk/faqdesk.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file, only the names of the env vars
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FaqDeskError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "faqdesk.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".faqdesk";

// ---------------------------------------------------------------------------
// Config structs (matching faqdesk.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// FAQ catalog table settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Ranking oracle settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Query log sink settings.
    #[serde(default)]
    pub query_log: QueryLogConfig,

    /// Conversational rewrite of matched answers.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the table API.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Document holding the FAQ table.
    #[serde(default)]
    pub doc_id: String,

    /// FAQ table id.
    #[serde(default)]
    pub table_id: String,

    /// Name of the env var holding the table API token.
    #[serde(default = "default_catalog_api_key_env")]
    pub api_key_env: String,

    /// Column carrying the question text.
    #[serde(default = "default_question_column")]
    pub question_column: String,

    /// Column carrying the answer (plain text or canvas).
    #[serde(default = "default_answer_column")]
    pub answer_column: String,

    /// Column carrying the optional external link.
    #[serde(default = "default_link_column")]
    pub link_column: String,

    /// Re-fetch the catalog before every query.
    #[serde(default = "default_true")]
    pub refresh_each_query: bool,

    /// HTTP timeout for table requests.
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            doc_id: String::new(),
            table_id: String::new(),
            api_key_env: default_catalog_api_key_env(),
            question_column: default_question_column(),
            answer_column: default_answer_column(),
            link_column: default_link_column(),
            refresh_each_query: true,
            timeout_secs: default_catalog_timeout(),
        }
    }
}

fn default_catalog_base_url() -> String {
    "https://coda.io/apis/v1".into()
}
fn default_catalog_api_key_env() -> String {
    "CODA_API_KEY".into()
}
fn default_question_column() -> String {
    "Question".into()
}
fn default_answer_column() -> String {
    "Next Step".into()
}
fn default_link_column() -> String {
    "Link".into()
}
fn default_true() -> bool {
    true
}
fn default_catalog_timeout() -> u64 {
    15
}

/// `[oracle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_oracle_api_key_env")]
    pub api_key_env: String,

    /// Model used for fallback ranking.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum reply tokens; the oracle only needs to answer with a number.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout.
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            api_key_env: default_oracle_api_key_env(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_oracle_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_oracle_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_tokens() -> u32 {
    10
}
fn default_oracle_timeout() -> u64 {
    30
}

/// `[reply]` section. The rewrite uses the `[oracle]` endpoint and model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Rewrite matched answers into conversational paragraphs.
    #[serde(default)]
    pub rewrite: bool,

    /// Maximum tokens of a rewritten answer.
    #[serde(default = "default_reply_max_tokens")]
    pub max_tokens: u32,

    /// Closing line appended to every rewritten reply.
    #[serde(default = "default_outro")]
    pub outro: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            rewrite: false,
            max_tokens: default_reply_max_tokens(),
            outro: default_outro(),
        }
    }
}

fn default_reply_max_tokens() -> u32 {
    300
}
fn default_outro() -> String {
    "Hope that helps!".into()
}

/// Where resolved queries are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSinkKind {
    /// Local libSQL database.
    #[default]
    Local,
    /// Remote table, same API as the catalog.
    Table,
    /// Do not record queries.
    Off,
}

/// `[query_log]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: LogSinkKind,

    /// Database path for the `local` sink (`~` is expanded).
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Document holding the log table (`table` sink).
    #[serde(default)]
    pub doc_id: String,

    /// Log table id (`table` sink).
    #[serde(default)]
    pub table_id: String,

    /// Column id receiving the user's display name.
    #[serde(default)]
    pub user_column: String,

    /// Column id receiving the query text.
    #[serde(default)]
    pub question_column: String,

    /// Column id receiving the RFC 3339 timestamp.
    #[serde(default)]
    pub timestamp_column: String,

    /// Column id receiving the matched entry identifier.
    #[serde(default)]
    pub matched_column: String,

    /// Column id receiving the matched question text.
    #[serde(default)]
    pub matched_question_column: String,
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            sink: LogSinkKind::default(),
            db_path: default_db_path(),
            doc_id: String::new(),
            table_id: String::new(),
            user_column: String::new(),
            question_column: String::new(),
            timestamp_column: String::new(),
            matched_column: String::new(),
            matched_question_column: String::new(),
        }
    }
}

fn default_db_path() -> String {
    "~/.faqdesk/query-log.db".into()
}

impl CatalogConfig {
    /// Ensure the table coordinates are filled in.
    pub fn validate(&self) -> Result<()> {
        if self.doc_id.trim().is_empty() || self.table_id.trim().is_empty() {
            return Err(FaqDeskError::config(
                "catalog.doc_id and catalog.table_id must be set",
            ));
        }
        Ok(())
    }
}

impl QueryLogConfig {
    /// Ensure the remote table sink has everything it needs.
    pub fn validate(&self) -> Result<()> {
        if self.sink != LogSinkKind::Table {
            return Ok(());
        }

        let required = [
            ("doc_id", &self.doc_id),
            ("table_id", &self.table_id),
            ("user_column", &self.user_column),
            ("question_column", &self.question_column),
            ("timestamp_column", &self.timestamp_column),
            ("matched_column", &self.matched_column),
            ("matched_question_column", &self.matched_question_column),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FaqDeskError::config(format!(
                "query_log.sink = \"table\" requires: {}",
                missing.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.faqdesk/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FaqDeskError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.faqdesk/faqdesk.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FaqDeskError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FaqDeskError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FaqDeskError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FaqDeskError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FaqDeskError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a secret from the named env var, failing with a helpful message
/// when it is unset or empty.
pub fn validate_api_key(var_name: &str, service: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(FaqDeskError::config(format!(
            "{service} API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
