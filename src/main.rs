// 🧾 Tally Trial Balance Extractor - CLI
// Probe Tally, pull the trial balance for a date range, classify it, and
// write the rows out for review.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process;

use tally_extract::{
    closing_by_classification, default_filename, write_csv_file, write_json_file, ExtractError,
    ExtractOptions, ExtractionPipeline, Period, TallyConnector, Totals,
};

#[derive(Debug, Parser)]
#[command(
    name = "tally-extract",
    version,
    about = "Extract and classify a Tally trial balance"
)]
struct Cli {
    /// Start date, DD-MM-YYYY
    #[arg(long = "from", value_name = "DD-MM-YYYY", default_value = "01-04-2024")]
    from_date: String,

    /// End date, DD-MM-YYYY
    #[arg(long = "to", value_name = "DD-MM-YYYY", default_value = "31-03-2025")]
    to_date: String,

    /// Tally host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Tally ODBC/XML server port
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Output filename (default: TrialBalance_<company>_<CY|PY>_<timestamp>)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Period type, for the Sheet Name tag only
    #[arg(long, value_parser = ["current", "previous"], default_value = "current")]
    period: String,

    /// Drop ledgers with zero opening and closing balances
    #[arg(long)]
    filter_zero: bool,

    /// Write JSON instead of CSV
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let period = if cli.period == "previous" {
        Period::Previous
    } else {
        Period::Current
    };

    let options = ExtractOptions {
        from_date: cli.from_date.clone(),
        to_date: cli.to_date.clone(),
        period,
        filter_zero: cli.filter_zero,
    };

    let connector = TallyConnector::new(&cli.host, cli.port);
    let mut pipeline = ExtractionPipeline::new(connector, options);

    // 1. Identity probe - greet with the company name before any data
    //    flows.
    println!("🔗 Connecting to Tally at {}:{}...", cli.host, cli.port);
    let company_name = match pipeline.connect() {
        Ok(name) => name,
        Err(_) => {
            eprintln!("❌ Cannot connect to Tally. Please ensure:");
            eprintln!("   1. Tally is running");
            eprintln!("   2. F12 > Advanced Configuration > Allow ODBC/XML Server = Yes");
            eprintln!("   3. ODBC Server Port = {}", cli.port);
            process::exit(1);
        }
    };

    println!("✅ Connected to Tally!");
    if let Some(name) = &company_name {
        println!("📊 Company: {}", name);
    }

    // 2. Data request + classification
    println!("\n📅 Fetching Trial Balance: {} to {}", cli.from_date, cli.to_date);
    let extraction = match pipeline.extract() {
        Ok(extraction) => extraction,
        Err(ExtractError::NoData) => {
            eprintln!("❌ No data returned. Check if the company has transactions in this period.");
            process::exit(1);
        }
        Err(ExtractError::MalformedResponse(err)) => {
            eprintln!("❌ Tally answered with a response that is not well-formed XML.");
            eprintln!("   Response preview: {}...", err.preview);
            process::exit(1);
        }
        Err(ExtractError::Unreachable) => {
            eprintln!("❌ Lost the connection to Tally mid-run.");
            process::exit(1);
        }
    };

    println!("✅ Fetched {} ledgers from Tally", extraction.fetched_count);
    if cli.filter_zero {
        println!("📋 After filtering zeros: {} ledgers", extraction.rows.len());
    }

    // 3. Export
    let extension = if cli.json { "json" } else { "csv" };
    let filename = cli.output.unwrap_or_else(|| {
        PathBuf::from(default_filename(
            extraction.company_name.as_deref(),
            period,
            extension,
        ))
    });

    if cli.json {
        write_json_file(&filename, &extraction.rows)?;
    } else {
        write_csv_file(&filename, &extraction.rows)?;
    }
    println!("\n💾 Exported to: {}", filename.display());

    // 4. Summary
    let totals = Totals::of(&extraction.rows);
    println!("\n==================================================");
    println!("📊 SUMMARY");
    println!("==================================================");
    println!("   Total Ledgers:     {}", totals.ledger_count);
    println!("   Opening Balance:   ₹{:>15.2}", totals.opening_balance);
    println!("   Total Debits:      ₹{:>15.2}", totals.total_debit);
    println!("   Total Credits:     ₹{:>15.2}", totals.total_credit);
    println!("   Closing Balance:   ₹{:>15.2}", totals.closing_balance);
    println!("==================================================");

    println!("\n📈 By H1 Classification:");
    for (bucket, total) in closing_by_classification(&extraction.rows) {
        println!("   {:<12} ₹{:>15.2}", bucket.as_str(), total);
    }

    Ok(())
}
