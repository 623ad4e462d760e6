//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use faqdesk_catalog::{TableCatalog, TableClient, TableLogSink};
use faqdesk_core::{ChatCompletionsOracle, FaqService, QueryLog, ReplyWriter, RetrievalEngine};
use faqdesk_render::{format_steps, format_value};
use faqdesk_shared::{
    AppConfig, LogSinkKind, expand_home, init_config, load_config, validate_api_key,
};
use faqdesk_storage::Storage;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{info, warn};

/// Shown when no entry answers the question.
const NOT_FOUND_MESSAGE: &str = "Sorry, I couldn't find a relevant FAQ.";

/// Rows whose raw answer cell is echoed after a dump.
const DUMP_PREVIEW_ROWS: usize = 3;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// faqdesk: answers from your FAQ table.
#[derive(Parser)]
#[command(
    name = "faqdesk",
    version,
    about = "Answer questions from a table-backed FAQ and render FAQ answers for chat.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ask a question against the FAQ catalog.
    Ask {
        /// The question (may include a leading chat mention).
        #[arg(required = true)]
        query: Vec<String>,

        /// Name recorded in the query log.
        #[arg(short, long, env = "USER", default_value = "anonymous")]
        user: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,

        /// Rewrite the matched answer conversationally (also `reply.rewrite`).
        #[arg(long)]
        rewrite: bool,
    },

    /// Render a JSON document tree (file path or `-` for stdin).
    Render {
        input: String,

        /// Print the rendered body and collected links as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Format plain text as a step list (file path or `-` for stdin).
    Steps { input: String },

    /// Inspect the FAQ catalog table.
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Inspect the local query log.
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Catalog subcommands.
#[derive(Subcommand)]
pub(crate) enum CatalogAction {
    /// Load the catalog and list its questions.
    List,
    /// Write every row, with column names and raw cell values, as JSON.
    Dump {
        #[arg(long, default_value = "catalog_dump.json")]
        out: PathBuf,
    },
}

/// Query log subcommands.
#[derive(Subcommand)]
pub(crate) enum LogAction {
    /// Show the most recent queries.
    Recent {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "faqdesk=info",
        1 => "faqdesk=debug",
        _ => "faqdesk=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ask {
            query,
            user,
            json,
            rewrite,
        } => cmd_ask(&query.join(" "), &user, json, rewrite).await,
        Command::Render { input, json } => cmd_render(&input, json),
        Command::Steps { input } => cmd_steps(&input),
        Command::Catalog { action } => match action {
            CatalogAction::List => cmd_catalog_list().await,
            CatalogAction::Dump { out } => cmd_catalog_dump(&out).await,
        },
        Command::Log { action } => match action {
            LogAction::Recent { limit } => cmd_log_recent(limit).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn table_client(config: &AppConfig) -> Result<TableClient> {
    let token = validate_api_key(&config.catalog.api_key_env, "Table")?;
    Ok(TableClient::new(
        &config.catalog.base_url,
        token,
        config.catalog.timeout_secs,
    )?)
}

fn table_catalog(config: &AppConfig) -> Result<TableCatalog> {
    let client = table_client(config)?;
    Ok(TableCatalog::from_config(client, &config.catalog)?)
}

async fn query_log(config: &AppConfig, client: &TableClient) -> Result<QueryLog> {
    let log = &config.query_log;
    Ok(match log.sink {
        LogSinkKind::Local => {
            let path = expand_home(&log.db_path);
            QueryLog::Local(Storage::open(&path).await?)
        }
        LogSinkKind::Table => QueryLog::Table(TableLogSink::from_config(client.clone(), log)?),
        LogSinkKind::Off => QueryLog::Disabled,
    })
}

/// Read a file, or stdin for `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .wrap_err("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).wrap_err_with(|| format!("failed to read {input}"))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ask(query: &str, user: &str, json: bool, rewrite: bool) -> Result<()> {
    let config = load_config()?;
    config.catalog.validate()?;
    config.query_log.validate()?;

    let client = table_client(&config)?;
    let catalog = TableCatalog::from_config(client.clone(), &config.catalog)?;

    let api_key = validate_api_key(&config.oracle.api_key_env, "Ranking model")?;
    let oracle = ChatCompletionsOracle::from_config(&config.oracle, api_key)?;
    let replies = (rewrite || config.reply.rewrite).then(|| {
        ReplyWriter::new(oracle.clone())
            .with_max_tokens(config.reply.max_tokens)
            .with_outro(&config.reply.outro)
    });
    let engine = RetrievalEngine::new(oracle).with_max_tokens(config.oracle.max_tokens);

    let sink = query_log(&config, &client).await?;
    let service = FaqService::new(catalog, engine, sink)
        .refresh_each_query(config.catalog.refresh_each_query);

    info!(user, "resolving question");
    let spinner = Spinner::new("Searching the FAQ...");
    let answer = service.ask(query, user).await;
    spinner.finish();
    let answer = answer?;

    let reply = match (&replies, &answer.result) {
        (Some(replies), Some(result)) => {
            let spinner = Spinner::new("Writing the reply...");
            let written = replies.write(&answer.query, &result.entry).await;
            spinner.finish();
            match written {
                Ok(reply) => Some(reply),
                Err(e) => {
                    warn!(error = %e, "rewrite failed, showing the FAQ answer as is");
                    None
                }
            }
        }
        _ => None,
    };

    if json {
        let output = json!({
            "query": answer.query,
            "result": answer.result,
            "reply": reply,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let Some(result) = answer.result else {
        println!("{NOT_FOUND_MESSAGE}");
        return Ok(());
    };

    if let Some(reply) = reply {
        println!();
        println!("{reply}");
        println!();
        return Ok(());
    }

    let entry = &result.entry;
    println!();
    println!("  Q: {}", entry.question);
    println!("  Match: {}", result.source);
    println!();
    println!("{}", entry.answer);
    if let Some(link) = &entry.link {
        println!();
        println!("Full FAQ: <{link}|{}>", entry.question);
    }
    println!();

    Ok(())
}

fn cmd_render(input: &str, json: bool) -> Result<()> {
    let raw = read_input(input)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).wrap_err("input is not valid JSON")?;

    let doc = format_value(&value);
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{}", doc.body);
    }
    Ok(())
}

fn cmd_steps(input: &str) -> Result<()> {
    let raw = read_input(input)?;
    println!("{}", format_steps(&raw));
    Ok(())
}

async fn cmd_catalog_list() -> Result<()> {
    let config = load_config()?;
    let catalog = table_catalog(&config)?;

    let spinner = Spinner::new("Loading catalog...");
    let entries = catalog.load_entries().await;
    spinner.finish();
    let entries = entries?;

    if entries.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        match &entry.link {
            Some(link) => println!("{:>4}. {}  ({link})", i + 1, entry.question),
            None => println!("{:>4}. {}", i + 1, entry.question),
        }
    }
    println!();
    println!("  {} entries", entries.len());

    Ok(())
}

async fn cmd_catalog_dump(out: &Path) -> Result<()> {
    let config = load_config()?;
    let catalog = table_catalog(&config)?;

    let spinner = Spinner::new("Dumping catalog rows...");
    let rows = catalog.dump_rows().await;
    spinner.finish();
    let rows = rows?;

    let content = serde_json::to_string_pretty(&rows)?;
    std::fs::write(out, content).wrap_err_with(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {} ({} rows).", out.display(), rows.len());

    let answer_column = catalog.answer_column();
    for (i, row) in rows.iter().take(DUMP_PREVIEW_ROWS).enumerate() {
        println!();
        println!("--- Row {} (id={}) ---", i + 1, row.row_id);
        match row.values.get(answer_column) {
            Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
            None => println!("No `{answer_column}` column found in this row."),
        }
    }

    Ok(())
}

async fn cmd_log_recent(limit: usize) -> Result<()> {
    let config = load_config()?;
    if config.query_log.sink != LogSinkKind::Local {
        return Err(eyre!(
            "query_log.sink is not \"local\"; recent queries are only kept locally"
        ));
    }

    let path = expand_home(&config.query_log.db_path);
    let storage = Storage::open_readonly(&path).await?;
    let queries = storage.recent_queries(limit).await?;

    if queries.is_empty() {
        println!("No queries recorded yet.");
        return Ok(());
    }

    for stored in &queries {
        let record = &stored.record;
        let matched = if record.matched_question.is_empty() {
            "(no match)".to_string()
        } else {
            format!("{} [{}]", record.matched_question, record.matched_id)
        };
        println!(
            "{}  {:<16}  {}  ->  {matched}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.user,
            record.question,
        );
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress spinner
// ---------------------------------------------------------------------------

/// Transient spinner on stderr while a network call is in flight.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_joins_words_and_takes_user() {
        let cli = Cli::try_parse_from(["faqdesk", "ask", "--user", "Ada", "reset", "password"])
            .unwrap();
        match cli.command {
            Command::Ask {
                query,
                user,
                json,
                rewrite,
            } => {
                assert_eq!(query.join(" "), "reset password");
                assert_eq!(user, "Ada");
                assert!(!json);
                assert!(!rewrite);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn ask_rewrite_flag() {
        let cli = Cli::try_parse_from(["faqdesk", "ask", "--rewrite", "--json", "vpn"]).unwrap();
        match cli.command {
            Command::Ask { rewrite, json, .. } => {
                assert!(rewrite);
                assert!(json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn dump_has_default_output_path() {
        let cli = Cli::try_parse_from(["faqdesk", "catalog", "dump"]).unwrap();
        match cli.command {
            Command::Catalog {
                action: CatalogAction::Dump { out },
            } => assert_eq!(out, PathBuf::from("catalog_dump.json")),
            _ => panic!("expected catalog dump"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["faqdesk", "steps", "-", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn read_input_reads_files() {
        let path = std::env::temp_dir().join(format!("faqdesk_input_{}.txt", std::process::id()));
        std::fs::write(&path, "Open app\nLog in").unwrap();
        let text = read_input(path.to_str().unwrap()).unwrap();
        assert_eq!(format_steps(&text), "1. Open app\n2. Log in");
        std::fs::remove_file(&path).ok();
    }
}
