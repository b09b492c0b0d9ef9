//! Ingest command - extract, store and mirror receipts.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use treecko_core::receipt::rules::format_latam_amount;
use treecko_core::{IngestError, IngestOutcome, Ingestor, TreeckoConfig};

use super::is_pdf;

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Receipt files (PDF, or extracted text)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// User the receipts are ingested on behalf of
    #[arg(short, long, default_value = "1")]
    user: i64,

    /// Keep going after a receipt fails
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: IngestArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let mut ingestor = Ingestor::from_config(config)?;
    let mut failures = 0usize;

    for input in &args.inputs {
        match ingest_file(&mut ingestor, args.user, input) {
            Ok(outcome) => print_outcome(input, &outcome),
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", style("✗").red(), input.display(), describe_error(&e));
                if !args.continue_on_error {
                    anyhow::bail!("Ingestion failed for {}", input.display());
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} receipts failed", failures, args.inputs.len());
    }

    Ok(())
}

fn ingest_file(
    ingestor: &mut Ingestor,
    user_id: i64,
    path: &Path,
) -> anyhow::Result<IngestOutcome> {
    info!(user_id, "Ingesting {}", path.display());

    let outcome = if is_pdf(path) {
        let data = fs::read(path)?;
        ingestor.ingest_pdf(user_id, &data)?
    } else {
        let text = fs::read_to_string(path)?;
        ingestor.ingest_text(user_id, &text)?
    };

    Ok(outcome)
}

fn print_outcome(path: &Path, outcome: &IngestOutcome) {
    let tx = &outcome.transaction;

    println!("{} {}", style("✓").green(), path.display());
    println!("   Date: {}", tx.date().format("%d/%m/%Y %H:%M"));
    println!(
        "   Amount: {}${}",
        tx.transaction_type().sign(),
        format_latam_amount(tx.amount())
    );
    println!("   Description: {}", tx.description());
    if let Some(merchant) = tx.merchant() {
        println!("   Merchant: {}", merchant);
    }
    if let Some(id) = tx.transaction_id() {
        println!("   Operation: {}", id);
    }
    println!("   Stored as #{} ({})", outcome.stored.id, outcome.mirror.describe());
}

/// User-facing message for a failed ingestion.
fn describe_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<IngestError>() {
        Some(IngestError::Unauthorized(message)) => message.to_string(),
        Some(IngestError::RateLimited { retry_after }) => {
            format!("Too many requests, try again in {:.0} seconds", retry_after.ceil())
        }
        Some(IngestError::Duplicate(id)) => {
            format!("Receipt already processed (operation {})", id)
        }
        Some(IngestError::Extraction(_)) => {
            "No transaction data could be read from the receipt".to_string()
        }
        Some(other) => other.to_string(),
        None => error.to_string(),
    }
}
