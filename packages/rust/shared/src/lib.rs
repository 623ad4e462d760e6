//! Shared types, error model, and configuration for faqdesk.
//!
//! This crate is the foundation depended on by all other faqdesk crates.
//! It provides:
//! - [`FaqDeskError`]: the unified error type
//! - Domain types ([`FaqEntry`], [`RetrievalResult`], [`QueryLogRecord`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, LogSinkKind, OracleConfig, QueryLogConfig, ReplyConfig,
    config_dir, config_file_path, expand_home, init_config, load_config, load_config_from,
    validate_api_key,
};
pub use error::{FaqDeskError, Result};
pub use types::{FaqEntry, MatchSource, NO_MATCH_ID, QueryLogRecord, RetrievalResult};
