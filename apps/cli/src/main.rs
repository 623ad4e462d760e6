//! faqdesk CLI: answer questions from a table-backed FAQ.
//!
//! Resolves questions by keyword overlap first and a ranking model second,
//! and renders FAQ answers (document trees or plain text) for chat.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
