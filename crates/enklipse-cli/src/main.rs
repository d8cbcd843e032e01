//! `enklipse` command-line client.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod context;

use commands::Command;
use context::{AppContext, GlobalArgs};

/// Submit scripts to the Enklipse render service and follow the results.
#[derive(Parser, Debug)]
#[command(name = "enklipse", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.global.verbose)?;

    let ctx = AppContext::from_args(&cli.global)?;
    commands::run(cli.command, &ctx).await
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "enklipse=debug"
    } else {
        "enklipse=info"
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing(verbose: bool) -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive(default_directive(verbose).parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}
