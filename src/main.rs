#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brandprobe::errors::BrandprobeError;
use brandprobe::types::OutputFormat;
use brandprobe::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

mod commands;

use crate::commands::utils::RenderArgs;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "brandprobe")]
#[command(version)]
#[command(about = "Extract a website's brand signature: colors, fonts and primary buttons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a URL, a domain or a brand name
    Analyze {
        /// URL, domain or brand name
        input: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the effective scoring heuristics as JSON
    Heuristics {
        /// Heuristics override file (JSON)
        #[arg(long)]
        heuristics: Option<PathBuf>,
    },

    /// Serve POST /analyze over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Maximum number of browser sessions open at once
        #[arg(long, default_value = "4")]
        max_sessions: usize,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let err: BrandprobeError = err.into();

            // JSON on stdout for programmatic consumers
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "exit_code": err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            render,
        } => commands::analyze::handle_analyze(input, format, render).await,
        Commands::Heuristics { heuristics } => {
            commands::heuristics::handle_heuristics(heuristics).await
        }
        #[cfg(feature = "server")]
        Commands::Serve {
            host,
            port,
            max_sessions,
            render,
        } => commands::serve::handle_serve(host, port, max_sessions, render).await,
    }
}
