//! Export command - dump stored transactions to CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use treecko_core::mirror::export_file_name;
use treecko_core::{export_csv, Clock, SystemClock, TransactionStore, TreeckoConfig};

use super::open_store;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: transactions_<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExportArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let transactions = store.all()?;

    if transactions.is_empty() {
        println!("No transactions to export.");
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_file_name(SystemClock.now())));

    let writer = BufWriter::new(File::create(&path)?);
    let count = export_csv(&transactions, writer)?;
    info!(count, "Exported transactions to {}", path.display());

    println!(
        "{} Exported {} transactions to {}",
        style("✓").green(),
        count,
        path.display()
    );

    Ok(())
}
