//! cli-search CLI
//!
//! Main entry point for the cli-search command-line tool.
//! Answers a natural-language question from live web results, with citations.

mod commands;
mod output;

use clap::{Parser, ValueEnum};
use clisearch_core::{config::AppConfig, logging, AppResult, LogLevel};
use commands::AskCommand;
use std::path::PathBuf;
use std::process::ExitCode;

/// cli-search - answer questions from the web with cited sources
#[derive(Parser, Debug)]
#[command(name = "cli-search")]
#[command(about = "Answer questions from the web with cited sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    ask: AskCommand,

    /// Log level
    #[arg(long, value_enum, ignore_case = true)]
    log_level: Option<LogLevelArg>,

    /// Path to config file
    #[arg(short, long, env = "CLISEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// LLM provider (openai, ollama)
    #[arg(short, long, env = "CLISEARCH_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, env = "CLISEARCH_MODEL")]
    model: Option<String>,

    /// Disable colored output (any non-empty NO_COLOR also disables it)
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,
}

/// Accepted `--log-level` values, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warning => LogLevel::Warning,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Critical => LogLevel::Critical,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit with status 2 from here
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Config file and environment first, then CLI overrides
    let config = AppConfig::load_from(cli.config.as_deref())?.with_overrides(
        cli.provider,
        cli.model,
        cli.ask.max_results,
        cli.ask.strict,
        cli.no_color,
    );

    let filter = logging::resolve_filter(
        cli.log_level.map(LogLevel::from),
        std::env::var("RUST_LOG").ok().as_deref(),
        config.log_level.as_deref(),
    );
    logging::init_logging(Some(&filter), config.no_color)?;

    tracing::info!("cli-search starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let result = cli.ask.execute(&config).await;
    if result.is_ok() {
        tracing::info!("Command completed successfully");
    }
    result
}
