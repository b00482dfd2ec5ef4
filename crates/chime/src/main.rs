// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! chime - a Telegram group-chat bot that joins the conversation.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// chime - a Telegram group-chat bot that joins the conversation.
#[derive(Parser, Debug)]
#[command(name = "chime", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway and message pipeline.
    Serve,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match chime_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            chime_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_new(&config.agent.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "serve failed");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => print_config_summary(&config),
        None => {
            println!("chime: use --help for available commands");
        }
    }
}

/// Print the effective configuration with credentials redacted.
fn print_config_summary(config: &chime_config::ChimeConfig) {
    println!("agent.name          = {}", config.agent.name);
    println!("agent.log_level     = {}", config.agent.log_level);
    println!(
        "telegram.bot_token  = {}",
        if config.telegram.bot_token.is_some() {
            "[set]"
        } else {
            "[not set]"
        }
    );
    println!("telegram.webhook_path = {}", config.telegram.webhook_path);
    println!(
        "openai.api_key      = {}",
        if config.openai.api_key.is_some() {
            "[set]"
        } else {
            "[not set]"
        }
    );
    println!("redis.url           = {}", config.redis.url);
    println!("storage.database_path = {}", config.storage.database_path);
    println!(
        "gateway             = {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "instruction         = model={} trigger_count={} context_count={}",
        config.instruction.model,
        config.instruction.trigger_count,
        config.instruction.context_count
    );
}
