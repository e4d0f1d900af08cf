mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "runcell")]
#[command(about = "Compile and run code snippets under a bounded time budget")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile (when the language needs it) and run a snippet
    Run {
        /// Language id or alias (see `runcell languages`)
        #[arg(short, long)]
        language: String,

        /// Source file path; '-' reads from stdin
        file: Option<String>,

        /// Inline source text instead of a file
        #[arg(short, long, conflicts_with = "file")]
        code: Option<String>,

        /// Run timeout in seconds, overriding the language profile
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Emit the raw execution outcome as JSON
        #[arg(long)]
        json: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the registered languages and their profiles
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            language,
            file,
            code,
            timeout,
            json,
            verbose,
        } => {
            init_logging(verbose);
            let exit_code = commands::execute_run(language, file, code, timeout, json).await?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
        Commands::Languages => {
            init_logging(false);
            commands::execute_languages();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "runcell_engine={},runcell_cli={}",
                    log_level, log_level
                ))
            }),
        )
        .init();
}
