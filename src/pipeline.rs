// ⚙️ Extraction Pipeline - probe, fetch, parse, classify, deliver
// Linear state machine: the identity probe gates the data request, and
// every failed run lands in exactly one terminal state.

use crate::classify::classify_line;
use crate::connector::LedgerSource;
use crate::parser::{parse_trial_balance, ResponseParseError};
use crate::records::{Classification, LedgerRow, Period};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// TERMINAL STATES
// ============================================================================

/// The three ways a run ends without rows. Callers match on the variant -
/// "system down", "nothing in the period" and "bad data shape" are
/// different situations and get different handling, no message parsing
/// required.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The identity probe failed: connection refused, non-200, or an
    /// unparseable probe body.
    #[error("Tally did not answer the identity probe")]
    Unreachable,

    /// The data request failed outright or produced zero ledger records.
    #[error("no ledger records for the requested period")]
    NoData,

    /// The data response was not well-formed XML.
    #[error(transparent)]
    MalformedResponse(#[from] ResponseParseError),
}

// ============================================================================
// OPTIONS & OUTPUT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Start of the range, DD-MM-YYYY, passed through to Tally untouched
    pub from_date: String,

    /// End of the range, DD-MM-YYYY
    pub to_date: String,

    /// Only affects the Sheet Name tag on exported rows
    pub period: Period,

    /// Drop ledgers whose opening and closing balances are both zero
    pub filter_zero: bool,
}

/// Output of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Company name from the identity probe, when Tally reported one
    pub company_name: Option<String>,

    /// How many ledgers survived parsing, before the zero filter
    pub fetched_count: usize,

    /// Classified rows, sorted by (primary group, ledger name)
    pub rows: Vec<LedgerRow>,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// One extraction run against a ledger source.
///
/// Each run is independent: fresh pipeline, fresh state, no retries
/// anywhere. A caller that wants to try again builds a new run.
pub struct ExtractionPipeline<S: LedgerSource> {
    source: S,
    options: ExtractOptions,
    connected: bool,
}

impl<S: LedgerSource> ExtractionPipeline<S> {
    pub fn new(source: S, options: ExtractOptions) -> Self {
        ExtractionPipeline {
            source,
            options,
            connected: false,
        }
    }

    /// Step one: identity probe. Nothing downstream runs until this has
    /// succeeded once.
    pub fn connect(&mut self) -> Result<Option<String>, ExtractError> {
        if !self.source.test_connection() {
            return Err(ExtractError::Unreachable);
        }
        self.connected = true;
        Ok(self.source.company_name().map(str::to_string))
    }

    /// Steps two to six: fetch, parse, classify, filter, sort.
    ///
    /// Probes first if `connect` has not succeeded yet - the data request
    /// is never issued against an unprobed endpoint.
    pub fn extract(&mut self) -> Result<Extraction, ExtractError> {
        if !self.connected {
            self.connect()?;
        }

        let body = self
            .source
            .fetch_trial_balance(&self.options.from_date, &self.options.to_date)
            .map_err(|_| ExtractError::NoData)?;

        let lines = parse_trial_balance(&body)?;
        if lines.is_empty() {
            return Err(ExtractError::NoData);
        }

        let sheet_name = self.options.period.sheet_name();
        let mut rows: Vec<LedgerRow> = lines
            .iter()
            .map(|line| classify_line(line, sheet_name))
            .collect();
        let fetched_count = rows.len();

        if self.options.filter_zero {
            rows = filter_zero_rows(rows);
        }

        // Sort for export: group first, then ledger name, case-sensitive.
        rows.sort_by(|a, b| {
            (&a.primary_group, &a.ledger_name).cmp(&(&b.primary_group, &b.ledger_name))
        });

        Ok(Extraction {
            company_name: self.source.company_name().map(str::to_string),
            fetched_count,
            rows,
        })
    }

    /// Full run: probe, then extract.
    pub fn run(&mut self) -> Result<Extraction, ExtractError> {
        self.connect()?;
        self.extract()
    }
}

/// Drop rows where opening and closing balances are both exactly zero.
/// Everything else - negative balances included - survives in order.
pub fn filter_zero_rows(rows: Vec<LedgerRow>) -> Vec<LedgerRow> {
    rows.into_iter()
        .filter(|row| row.opening_balance != 0.0 || row.closing_balance != 0.0)
        .collect()
}

// ============================================================================
// SUMMARIES
// ============================================================================

/// Column sums for the post-run summary bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub ledger_count: usize,
    pub opening_balance: f64,
    pub total_debit: f64,
    pub total_credit: f64,
    pub closing_balance: f64,
}

impl Totals {
    pub fn of(rows: &[LedgerRow]) -> Totals {
        Totals {
            ledger_count: rows.len(),
            opening_balance: rows.iter().map(|r| r.opening_balance).sum(),
            total_debit: rows.iter().map(|r| r.debit).sum(),
            total_credit: rows.iter().map(|r| r.credit).sum(),
            closing_balance: rows.iter().map(|r| r.closing_balance).sum(),
        }
    }
}

/// Closing balance summed per H1 bucket, in fixed bucket order. Buckets
/// with no rows are left out.
pub fn closing_by_classification(rows: &[LedgerRow]) -> Vec<(Classification, f64)> {
    Classification::ALL
        .iter()
        .copied()
        .filter(|bucket| rows.iter().any(|row| row.h1 == *bucket))
        .map(|bucket| {
            let total = rows
                .iter()
                .filter(|row| row.h1 == bucket)
                .map(|row| row.closing_balance)
                .sum();
            (bucket, total)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
