//! Proposal Web Server
//!
//! Authenticated, role-checked HTTP API for users, companies, permissions,
//! contracts and categories.

use anyhow::Context;
use clap::Parser;
use proposal_core::{init_logging, Settings};
use proposal_web::ProposalServerBuilder;
use std::path::PathBuf;

/// Proposal Web Server
#[derive(Parser)]
#[command(name = "proposal-web")]
#[command(about = "Authenticated HTTP API for proposal")]
#[command(version)]
struct Args {
    /// Settings file (defaults to ./proposal.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL, e.g. sqlite://proposal.db?mode=rwc
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut settings = match Settings::load_from(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            for suggestion in &e.context().recovery_suggestions {
                eprintln!("  hint: {suggestion}");
            }
            return Err(e).context("invalid configuration");
        }
    };

    if let Some(level) = args.log_level {
        settings.logging = settings.logging.with_level(level);
    }
    init_logging(&settings.logging).context("failed to initialise logging")?;

    let mut builder = ProposalServerBuilder::new(settings);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    let server = builder.build().await.context("failed to start server")?;
    server.start().await.context("server stopped with an error")?;

    Ok(())
}
