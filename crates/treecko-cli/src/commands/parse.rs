//! Parse command - extract a transaction from a single receipt.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use treecko_core::receipt::rules::format_latam_amount;
use treecko_core::{PageTextSource, ParsedTransaction, PdfExtractor, ReceiptParser, TreeckoConfig};

use super::{build_parser, is_pdf};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Receipt file (PDF, or plain text already extracted from one)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing receipt: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading receipt...");

    let parser = build_parser(config);
    let transaction = read_receipt(&args.input, &parser, config);
    pb.finish_and_clear();
    let transaction = transaction?;

    let output = format_transaction(&transaction, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Extract a transaction from a PDF or text receipt on disk.
pub fn read_receipt(
    path: &Path,
    parser: &ReceiptParser,
    config: &TreeckoConfig,
) -> anyhow::Result<ParsedTransaction> {
    if is_pdf(path) {
        let data = fs::read(path)?;
        let mut extractor = PdfExtractor::with_config(config.pdf.clone());
        extractor.load(&data)?;
        debug!("PDF has {} pages", extractor.page_count());

        let pages = extractor.page_texts()?;
        Ok(parser.parse_pages(pages)?)
    } else {
        let text = fs::read_to_string(path)?;
        Ok(parser.parse(&text)?)
    }
}

pub fn format_transaction(
    transaction: &ParsedTransaction,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transaction)?),
        OutputFormat::Csv => format_csv(transaction),
        OutputFormat::Text => Ok(format_text(transaction)),
    }
}

fn format_csv(transaction: &ParsedTransaction) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "transaction_id",
        "date",
        "description",
        "amount",
        "type",
        "merchant",
    ])?;

    let date = transaction.date().format("%Y-%m-%d %H:%M:%S").to_string();
    let amount = transaction.amount().to_string();
    wtr.write_record([
        transaction.transaction_id().unwrap_or_default(),
        date.as_str(),
        transaction.description(),
        amount.as_str(),
        transaction.transaction_type().as_str(),
        transaction.merchant().unwrap_or_default(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(transaction: &ParsedTransaction) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Operation: {}\n",
        transaction.transaction_id().unwrap_or("-")
    ));
    output.push_str(&format!("Date: {}\n", transaction.date().format("%d/%m/%Y %H:%M")));
    output.push_str(&format!("Type: {}\n", transaction.transaction_type()));
    output.push_str(&format!(
        "Amount: {}${}\n",
        transaction.transaction_type().sign(),
        format_latam_amount(transaction.amount())
    ));
    output.push_str(&format!("Description: {}\n", transaction.description()));
    if let Some(merchant) = transaction.merchant() {
        output.push_str(&format!("Merchant: {}\n", merchant));
    }

    output
}
