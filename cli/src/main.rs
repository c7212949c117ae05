// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Hive CLI
//!
//! The `hive` binary drives a file-backed hive: each invocation loads the
//! persisted state, runs one operation and saves the result.
//!
//! ## Commands
//!
//! - `hive init|status|join|leave|spawn|broadcast|shutdown` - Membership and lifecycle
//! - `hive voting propose|vote|status|list` - Proposal voting
//! - `hive memory get|set|delete|list` - Shared memory
//! - `hive config show|validate|generate` - Configuration management
//!
//! Every hive operation prints its response as JSON and exits with status 1
//! when the operation failed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use hive_cli::commands::{self, ConfigCommand, HiveCommand};
use hive_cli::output::print_response;
use hive_core::application::HiveServices;
use hive_core::domain::config::HiveConfig;
use hive_core::infrastructure::{JsonFileAgentStore, JsonFileHiveStore};

/// Hive - coordinate a collective of worker agents
#[derive(Parser)]
#[command(name = "hive")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "HIVE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    #[command(flatten)]
    Hive(HiveCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Hive(command) => {
            let config = HiveConfig::load_or_default(cli.config).context("Failed to load configuration")?;
            debug!(
                state_path = %config.state_path.display(),
                agents_path = %config.agents_path.display(),
                "Opening hive"
            );
            let services = HiveServices::new(
                Arc::new(JsonFileHiveStore::new(&config.state_path)),
                Arc::new(JsonFileAgentStore::new(&config.agents_path)),
                &config,
            );

            let response = commands::execute(command, &services.tools()).await;
            let code = print_response(&response)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    // stdout carries the JSON response
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
