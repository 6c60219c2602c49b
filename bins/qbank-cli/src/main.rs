mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qbank-cli")]
#[command(about = "qbank CLI - Run and validate code submissions locally", long_about = None)]
struct Cli {
    /// Path to languages.json (built-in toolchains when the file is missing)
    #[arg(long, global = true, default_value = "config/languages.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file against a set of test cases
    Run {
        /// Language name (java, python, javascript)
        #[arg(short, long)]
        language: String,

        /// Source file to test
        #[arg(short, long)]
        source: PathBuf,

        /// JSON file with the test cases
        #[arg(short, long)]
        cases: PathBuf,

        /// Parent directory for the per-run workspaces
        #[arg(long)]
        temp_root: Option<PathBuf>,
    },

    /// Check a source file for syntax errors without running it
    Validate {
        /// Language name (java, python, javascript)
        #[arg(short, long)]
        language: String,

        /// Source file to check
        #[arg(short, long)]
        source: PathBuf,

        /// Parent directory for the per-run workspaces
        #[arg(long)]
        temp_root: Option<PathBuf>,
    },

    /// List the configured languages
    Languages,

    /// Write the built-in toolchain settings to a languages.json file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let succeeded = match cli.command {
        Commands::Run {
            language,
            source,
            cases,
            temp_root,
        } => {
            commands::run_tests(&cli.config, &language, &source, &cases, temp_root.as_deref())
                .await?
        }
        Commands::Validate {
            language,
            source,
            temp_root,
        } => {
            commands::validate_source(&cli.config, &language, &source, temp_root.as_deref())
                .await?
        }
        Commands::Languages => {
            commands::list_languages(&cli.config)?;
            true
        }
        Commands::InitConfig { force } => {
            commands::init_config(&cli.config, force)?;
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
