// 📒 Trial Balance Records - Typed ledger rows
// Raw lines as reported by Tally's collection, plus the classified row
// handed to the exporter.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// RAW LINE (as reported by Tally)
// ============================================================================

/// One ledger row as reported by Tally's trial balance collection.
///
/// Created once per parsed LEDGER element and immutable afterwards. A
/// record without an account name never gets this far - the parser drops
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account name (never empty)
    pub name: String,

    /// Parent group (may be empty)
    pub parent: String,

    /// Primary group; falls back to the parent group when Tally reports
    /// it blank
    pub primary_group: String,

    /// Signed opening balance (credit balances are negative)
    pub opening_balance: f64,

    /// Period debit total, non-negative magnitude
    pub total_debit: f64,

    /// Period credit total, non-negative magnitude
    pub total_credit: f64,

    /// Signed closing balance (credit balances are negative)
    pub closing_balance: f64,

    /// Whether Tally marks this ledger as a revenue account
    pub is_revenue: bool,
}

// ============================================================================
// H1 CLASSIFICATION
// ============================================================================

/// Top-level accounting bucket derived from the revenue flag and balance
/// sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Asset,
    Liability,
    Income,
    Expense,
}

impl Classification {
    /// All buckets in summary display order.
    pub const ALL: [Classification; 4] = [
        Classification::Asset,
        Classification::Liability,
        Classification::Income,
        Classification::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Asset => "Asset",
            Classification::Liability => "Liability",
            Classification::Income => "Income",
            Classification::Expense => "Expense",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REPORTING PERIOD
// ============================================================================

/// Which year the extract covers. Only affects the Sheet Name tag and the
/// default export filename, never the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Current,
    Previous,
}

impl Period {
    /// Sheet/period tag stamped on every exported row.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Period::Current => "TB CY",
            Period::Previous => "TB PY",
        }
    }

    /// Short code for filenames.
    pub fn code(&self) -> &'static str {
        match self {
            Period::Current => "CY",
            Period::Previous => "PY",
        }
    }
}

// ============================================================================
// CLASSIFIED ROW (the exported unit)
// ============================================================================

/// The classified, export-ready row. Derived from exactly one
/// `TrialBalanceLine` and immutable afterwards.
///
/// The serde renames are the column contract: spreadsheet and report
/// consumers bind these headers by name, so a rename here is a breaking
/// change for every downstream sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Ledger Name")]
    pub ledger_name: String,

    #[serde(rename = "Primary Group")]
    pub primary_group: String,

    #[serde(rename = "Parent Group")]
    pub parent_group: String,

    /// Stable hash of (name, primary group); see `classify::ledger_key`
    #[serde(rename = "Composite Key")]
    pub composite_key: String,

    #[serde(rename = "Opening Balance")]
    pub opening_balance: f64,

    #[serde(rename = "Debit")]
    pub debit: f64,

    #[serde(rename = "Credit")]
    pub credit: f64,

    #[serde(rename = "Closing Balance")]
    pub closing_balance: f64,

    #[serde(rename = "ABS Opening Balance")]
    pub abs_opening_balance: f64,

    #[serde(rename = "ABS Closing Balance")]
    pub abs_closing_balance: f64,

    /// "Yes" / "No" display label
    #[serde(rename = "Is Revenue")]
    pub is_revenue: String,

    #[serde(rename = "H1")]
    pub h1: Classification,

    /// Note group, filled in later by the reviewing accountant
    #[serde(rename = "H2", default)]
    pub h2: String,

    /// Sub-note, filled in later by the reviewing accountant
    #[serde(rename = "H3", default)]
    pub h3: String,

    #[serde(rename = "Notes", default)]
    pub notes: String,

    #[serde(rename = "Sheet Name")]
    pub sheet_name: String,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> LedgerRow {
        LedgerRow {
            ledger_name: "Cash in Hand".to_string(),
            primary_group: "Current Assets".to_string(),
            parent_group: "Cash-in-Hand".to_string(),
            composite_key: "0123456789abcdef".to_string(),
            opening_balance: 1500.0,
            debit: 200.0,
            credit: 50.0,
            closing_balance: 1650.0,
            abs_opening_balance: 1500.0,
            abs_closing_balance: 1650.0,
            is_revenue: "No".to_string(),
            h1: Classification::Liability,
            h2: String::new(),
            h3: String::new(),
            notes: String::new(),
            sheet_name: "TB CY".to_string(),
        }
    }

    #[test]
    fn test_row_serializes_with_display_column_names() {
        let json = serde_json::to_string(&sample_row()).unwrap();

        assert!(json.contains("\"Ledger Name\":\"Cash in Hand\""));
        assert!(json.contains("\"Composite Key\":\"0123456789abcdef\""));
        assert!(json.contains("\"ABS Closing Balance\":1650.0"));
        assert!(json.contains("\"H1\":\"Liability\""));
        assert!(json.contains("\"Sheet Name\":\"TB CY\""));
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(Classification::Asset.as_str(), "Asset");
        assert_eq!(Classification::Expense.to_string(), "Expense");
        assert_eq!(Classification::ALL.len(), 4);
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(Period::Current.sheet_name(), "TB CY");
        assert_eq!(Period::Previous.sheet_name(), "TB PY");
        assert_eq!(Period::Current.code(), "CY");
        assert_eq!(Period::Previous.code(), "PY");
    }
}
