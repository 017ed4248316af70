// 📤 Row Export - ordered rows to CSV or JSON
// Writes whatever order the pipeline handed over. Column naming lives on
// `LedgerRow`'s serde renames, so every writer emits the same headers.

use crate::records::{LedgerRow, Period};
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write rows as CSV with the stable display headers.
pub fn write_csv<W: Write>(writer: W, rows: &[LedgerRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .context("failed to serialize ledger row")?;
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, rows: &[LedgerRow]) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("failed to create {}", path.as_ref().display()))?;
    write_csv(file, rows)
}

/// Write rows as pretty-printed JSON, same field names as the CSV
/// headers.
pub fn write_json<W: Write>(writer: W, rows: &[LedgerRow]) -> Result<()> {
    serde_json::to_writer_pretty(writer, rows).context("failed to serialize ledger rows")?;
    Ok(())
}

pub fn write_json_file<P: AsRef<Path>>(path: P, rows: &[LedgerRow]) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("failed to create {}", path.as_ref().display()))?;
    write_json(file, rows)
}

/// Default export filename: company, period code, local timestamp.
/// Spaces and slashes in the company name are made path-safe.
pub fn default_filename(company_name: Option<&str>, period: Period, extension: &str) -> String {
    let company_safe = company_name
        .unwrap_or("Unknown")
        .replace(' ', "_")
        .replace('/', "-");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!(
        "TrialBalance_{}_{}_{}.{}",
        company_safe,
        period.code(),
        timestamp,
        extension
    )
}

// ============================================================================
// TESTS
// ============================================================================
