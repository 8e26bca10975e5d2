// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Postforge - LLM post generation with batch job polling.
//!
//! This is the binary entry point: it loads configuration, installs logging,
//! and drives the batch poller or inspects stored jobs.

mod jobs;
mod patterns;
mod poll;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postforge_config::PostforgeConfig;

/// Postforge - LLM post generation with batch job polling.
#[derive(Parser, Debug)]
#[command(name = "postforge", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one batch poll pass and exit.
    Poll,
    /// Poll batch jobs on a schedule until interrupted.
    Watch {
        /// Seconds between passes (defaults to `batch.poll_interval_secs`).
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// List recent batch jobs, newest first.
    Jobs {
        /// Maximum number of jobs (defaults to `batch.history_limit`).
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one batch job and its drafts.
    Job {
        batch_id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the pattern constraint block for an account's next post.
    Patterns { account_id: String },
    /// Manage Postforge configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate configuration and print the effective settings summary.
    Check,
}

fn load(path: Option<&std::path::Path>) -> PostforgeConfig {
    let loaded = match path {
        Some(path) => postforge_config::load_and_validate_path(path),
        None => postforge_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            postforge_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load(cli.config.as_deref());
    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Poll) => poll::run_poll(&config).await,
        Some(Commands::Watch { interval }) => poll::run_watch(&config, interval).await,
        Some(Commands::Jobs { limit, json }) => jobs::run_jobs(&config, limit, json).await,
        Some(Commands::Job { batch_id, json }) => jobs::run_job(&config, &batch_id, json).await,
        Some(Commands::Patterns { account_id }) => {
            patterns::run_patterns(&config, &account_id).await
        }
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            print_config_summary(&config);
            Ok(())
        }
        None => {
            println!("postforge: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config_summary(config: &PostforgeConfig) {
    println!("config OK");
    println!("  database:       {}", config.storage.database_path);
    println!("  batch provider: {}", config.batch.provider);
    println!("  poll interval:  {}s", config.batch.poll_interval_secs);
    println!(
        "  daily budget:   {}",
        config
            .cost
            .daily_budget_usd
            .map_or_else(|| "unlimited".to_string(), |b| format!("${b:.2}"))
    );
    println!(
        "  monthly budget: {}",
        config
            .cost
            .monthly_budget_usd
            .map_or_else(|| "unlimited".to_string(), |b| format!("${b:.2}"))
    );
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("postforge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
