//! Report command - income and expense totals over a period.

use clap::Args;
use console::style;
use serde_json::json;

use treecko_core::receipt::rules::format_latam_amount;
use treecko_core::{Clock, ReportPeriod, SystemClock, TransactionStore, TransactionSummary, TreeckoConfig};

use super::open_store;

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// week, month, year or all (anything else means month)
    #[arg(default_value = "month")]
    period: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ReportArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let period = ReportPeriod::parse(&args.period);
    let (start, end) = period.range(SystemClock.now());

    let summary = store.summary(start, Some(end))?;

    if args.json {
        let value = json!({
            "period": period.label(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_summary(period, &summary));
    }

    Ok(())
}

fn format_summary(period: ReportPeriod, summary: &TransactionSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", style(format!("Summary ({})", period.label())).bold()));
    output.push_str(&format!(
        "  Income:   +${} ({} transactions)\n",
        format_latam_amount(summary.total_income),
        summary.income_count
    ));
    output.push_str(&format!(
        "  Expenses: -${} ({} transactions)\n",
        format_latam_amount(summary.total_expense),
        summary.expense_count
    ));
    output.push_str(&format!(
        "  Balance:  ${}\n",
        format_latam_amount(summary.net_balance)
    ));
    output.push_str(&format!("  Total:    {} transactions\n", summary.transaction_count));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_format_summary() {
        let summary = TransactionSummary {
            total_income: Decimal::new(8500000, 2),
            total_expense: Decimal::new(1384125, 2),
            net_balance: Decimal::new(7115875, 2),
            transaction_count: 3,
            income_count: 1,
            expense_count: 2,
        };

        let text = format_summary(ReportPeriod::Year, &summary);
        assert!(text.contains("last year"));
        assert!(text.contains("Income:   +$85.000,00 (1 transactions)"));
        assert!(text.contains("Expenses: -$13.841,25 (2 transactions)"));
        assert!(text.contains("Balance:  $71.158,75"));
        assert!(text.contains("Total:    3 transactions"));
    }
}
