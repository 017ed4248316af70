// 🏷️ Ledger Classification - composite keys and H1 buckets
// Pure derivations: one trial balance line in, one classified row out.

use crate::records::{Classification, LedgerRow, TrialBalanceLine};
use sha2::{Digest, Sha256};

/// Stable composite key for one ledger.
///
/// Name and primary group are trimmed, lower-cased and joined with `|`,
/// then SHA-256 hashed and truncated to 16 hex characters. Amounts never
/// participate, so the key is identical across runs and across periods -
/// that is what lets exported rows be matched for reconciliation.
pub fn ledger_key(name: &str, primary_group: &str) -> String {
    let combined = format!(
        "{}|{}",
        name.trim().to_lowercase(),
        primary_group.trim().to_lowercase()
    );

    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Derive the H1 bucket from the revenue flag and balance signs.
///
/// The closing balance decides the sign unless it is exactly zero, in
/// which case the opening balance does. A zero sign value takes the
/// non-debit branch, so fully zero ledgers land in Income/Liability -
/// downstream totals depend on that exact tie-break.
pub fn derive_classification(
    is_revenue: bool,
    closing_balance: f64,
    opening_balance: f64,
) -> Classification {
    let sign_value = if closing_balance != 0.0 {
        closing_balance
    } else {
        opening_balance
    };
    let is_debit = sign_value < 0.0;

    match (is_revenue, is_debit) {
        (true, true) => Classification::Expense,
        (true, false) => Classification::Income,
        (false, true) => Classification::Asset,
        (false, false) => Classification::Liability,
    }
}

/// Build the classified export row for one trial balance line.
///
/// Total over its input: every line gets a row, in order, exactly one
/// each.
pub fn classify_line(line: &TrialBalanceLine, sheet_name: &str) -> LedgerRow {
    LedgerRow {
        ledger_name: line.name.clone(),
        primary_group: line.primary_group.clone(),
        parent_group: line.parent.clone(),
        composite_key: ledger_key(&line.name, &line.primary_group),
        opening_balance: line.opening_balance,
        debit: line.total_debit.abs(),
        credit: line.total_credit.abs(),
        closing_balance: line.closing_balance,
        abs_opening_balance: line.opening_balance.abs(),
        abs_closing_balance: line.closing_balance.abs(),
        is_revenue: if line.is_revenue { "Yes" } else { "No" }.to_string(),
        h1: derive_classification(line.is_revenue, line.closing_balance, line.opening_balance),
        h2: String::new(),
        h3: String::new(),
        notes: String::new(),
        sheet_name: sheet_name.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
