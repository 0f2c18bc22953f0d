//! planloop CLI, the main entry point.
//!
//! Commands:
//! - `run`     Drive the agent loop on one question
//! - `tools`   List the enabled tools
//! - `config`  Show or initialise the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planloop_config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "planloop",
    about = "planloop: a plan-act-observe agent loop",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.planloop/config.toml
    #[arg(short, long, global = true, env = "PLANLOOP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question by running the agent loop
    Run {
        /// Planner script (TOML) to replay; defaults to ~/.planloop/plan.toml
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Override agent.max_iterations
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Override agent.timeout_secs
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// The question to answer
        question: String,
    },

    /// List the enabled tools
    Tools,

    /// Print the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    init_tracing(cli.verbose, &config.logging);

    match cli.command {
        Commands::Run {
            script,
            max_iterations,
            timeout_secs,
            question,
        } => {
            let overrides = commands::run::Overrides {
                script,
                max_iterations,
                timeout_secs,
            };
            commands::run::run(config, overrides, question).await?
        }
        Commands::Tools => commands::tools::run(&config),
        Commands::Config { init } => commands::config_cmd::run(&config, &config_path, init)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug, else the configured level.
fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let default = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
