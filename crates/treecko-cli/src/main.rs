//! CLI application for ingesting MercadoPago PDF receipts.

mod commands;
mod health_server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{batch, categories, config, export, health, ingest, parse, report};
use treecko_core::logging::{build_subscriber, LogConfig};

/// Treecko - turn MercadoPago receipts into a transaction ledger
#[derive(Parser)]
#[command(name = "treecko")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a transaction from a single receipt without storing it
    Parse(parse::ParseArgs),

    /// Extract transactions from many receipts
    Batch(batch::BatchArgs),

    /// Extract, store and mirror a receipt
    Ingest(ingest::IngestArgs),

    /// Summarize stored transactions over a period
    Report(report::ReportArgs),

    /// Export stored transactions as CSV
    Export(export::ExportArgs),

    /// Manage transaction categories
    Categories(categories::CategoriesArgs),

    /// Serve or print the health status
    Health(health::HealthArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config subcommands must work before the file they manage exists.
    let settings = match cli.command {
        Commands::Config(_) => commands::load_config(None)?,
        _ => commands::load_config(config_path)?,
    };
    let log_config = LogConfig::from_config(&settings.logging).with_verbosity(cli.verbose);
    tracing::subscriber::set_global_default(build_subscriber(&log_config))?;

    match cli.command {
        Commands::Parse(args) => parse::run(args, &settings).await,
        Commands::Batch(args) => batch::run(args, &settings).await,
        Commands::Ingest(args) => ingest::run(args, &settings).await,
        Commands::Report(args) => report::run(args, &settings).await,
        Commands::Export(args) => export::run(args, &settings).await,
        Commands::Categories(args) => categories::run(args, &settings).await,
        Commands::Health(args) => health::run(args, &settings).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
