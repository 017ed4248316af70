// 📨 Response Parser - Tally XML to trial balance lines
// The response envelope's internal nesting varies between Tally builds,
// so LEDGER elements are collected wherever they appear in the document.

use crate::amount::parse_amount;
use crate::records::TrialBalanceLine;
use roxmltree::{Document, Node};
use thiserror::Error;

/// How much of an unparseable payload to keep for diagnostics.
const PREVIEW_LEN: usize = 500;

/// Document-level failure: the response body is not well-formed XML.
///
/// Carries the start of the offending payload so the bad response can be
/// inspected without re-running the request. No partial rows are ever
/// recovered from a broken document.
#[derive(Debug, Error)]
#[error("response is not well-formed XML: {source}")]
pub struct ResponseParseError {
    /// First part of the offending payload
    pub preview: String,
    #[source]
    pub source: roxmltree::Error,
}

/// Parse a trial balance response into raw lines, in document order.
///
/// Field-level defects stay field-level: a record without a usable name
/// is dropped silently, an unparseable amount becomes 0.0. Only a
/// non-well-formed document fails the call.
pub fn parse_trial_balance(xml: &str) -> Result<Vec<TrialBalanceLine>, ResponseParseError> {
    let doc = Document::parse(xml).map_err(|source| ResponseParseError {
        preview: payload_preview(xml),
        source,
    })?;

    let mut lines = Vec::new();

    for ledger in doc.descendants().filter(|n| n.has_tag_name("LEDGER")) {
        // The TDL field answers as LEDGERNAME, but some Tally builds use
        // the native NAME tag instead.
        let name = child_text(&ledger, "LEDGERNAME")
            .or_else(|| child_text(&ledger, "NAME"))
            .unwrap_or("")
            .trim();

        // A ledger without a name cannot be keyed or classified.
        if name.is_empty() {
            continue;
        }

        let parent = child_text(&ledger, "PARENT").unwrap_or("").trim().to_string();

        let primary_group = child_text(&ledger, "PRIMARYGROUP").unwrap_or("").trim();
        let primary_group = if primary_group.is_empty() {
            parent.clone()
        } else {
            primary_group.to_string()
        };

        let opening = parse_amount(child_text(&ledger, "OPENINGBALANCE").unwrap_or("0"));
        let debit = parse_amount(child_text(&ledger, "TOTALDEBIT").unwrap_or("0"));
        let credit = parse_amount(child_text(&ledger, "TOTALCREDIT").unwrap_or("0"));
        let closing = parse_amount(child_text(&ledger, "CLOSINGBALANCE").unwrap_or("0"));

        let is_revenue = matches!(
            child_text(&ledger, "ISREVENUE")
                .unwrap_or("")
                .trim()
                .to_lowercase()
                .as_str(),
            "yes" | "true" | "1"
        );

        lines.push(TrialBalanceLine {
            name: name.to_string(),
            parent,
            primary_group,
            opening_balance: opening,
            // Debit/credit totals are reported as magnitudes; the sign
            // convention only applies to the balances.
            total_debit: debit.abs(),
            total_credit: credit.abs(),
            closing_balance: closing,
            is_revenue,
        });
    }

    Ok(lines)
}

/// Text of the first direct child element with the given tag.
fn child_text<'a>(node: &Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
}

fn payload_preview(xml: &str) -> String {
    xml.chars().take(PREVIEW_LEN).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(records: &str) -> String {
        format!(
            "<ENVELOPE><BODY><DATA><COLLECTION>{}</COLLECTION></DATA></BODY></ENVELOPE>",
            records
        )
    }

    #[test]
    fn test_parses_a_full_record() {
        let xml = wrap(
            "<LEDGER>
                <LEDGERNAME>Acme Supplies</LEDGERNAME>
                <PARENT>Sundry Creditors</PARENT>
                <PRIMARYGROUP>Current Liabilities</PRIMARYGROUP>
                <OPENINGBALANCE>1,500.00 Cr</OPENINGBALANCE>
                <TOTALDEBIT>250.00</TOTALDEBIT>
                <TOTALCREDIT>1,250.00 Cr</TOTALCREDIT>
                <CLOSINGBALANCE>2,500.00 Cr</CLOSINGBALANCE>
                <ISREVENUE>No</ISREVENUE>
            </LEDGER>",
        );

        let lines = parse_trial_balance(&xml).unwrap();
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert_eq!(line.name, "Acme Supplies");
        assert_eq!(line.parent, "Sundry Creditors");
        assert_eq!(line.primary_group, "Current Liabilities");
        assert_eq!(line.opening_balance, -1500.0);
        assert_eq!(line.total_debit, 250.0);
        // Credit totals are magnitudes even when Tally suffixes them
        assert_eq!(line.total_credit, 1250.0);
        assert_eq!(line.closing_balance, -2500.0);
        assert!(!line.is_revenue);
    }

    #[test]
    fn test_name_falls_back_to_native_tag() {
        let xml = wrap("<LEDGER><NAME>Machinery</NAME><PARENT>Fixed Assets</PARENT></LEDGER>");
        let lines = parse_trial_balance(&xml).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Machinery");
    }

    #[test]
    fn test_nameless_records_are_dropped_silently() {
        let xml = wrap(
            "<LEDGER><PARENT>Sundry Debtors</PARENT></LEDGER>
             <LEDGER><LEDGERNAME>   </LEDGERNAME></LEDGER>
             <LEDGER><LEDGERNAME>Kept</LEDGERNAME></LEDGER>",
        );
        let lines = parse_trial_balance(&xml).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Kept");
    }

    #[test]
    fn test_primary_group_falls_back_to_parent() {
        let xml = wrap(
            "<LEDGER><LEDGERNAME>Rent</LEDGERNAME><PARENT>Indirect Expenses</PARENT></LEDGER>",
        );
        let lines = parse_trial_balance(&xml).unwrap();
        assert_eq!(lines[0].primary_group, "Indirect Expenses");
        assert_eq!(lines[0].parent, "Indirect Expenses");
    }

    #[test]
    fn test_revenue_flag_token_set() {
        for (token, expected) in [
            ("Yes", true),
            ("yes", true),
            ("TRUE", true),
            ("1", true),
            (" yes ", true),
            ("No", false),
            ("0", false),
            ("maybe", false),
            ("", false),
        ] {
            let xml = wrap(&format!(
                "<LEDGER><LEDGERNAME>X</LEDGERNAME><ISREVENUE>{}</ISREVENUE></LEDGER>",
                token
            ));
            let lines = parse_trial_balance(&xml).unwrap();
            assert_eq!(lines[0].is_revenue, expected, "token {:?}", token);
        }
    }

    #[test]
    fn test_missing_amount_fields_default_to_zero() {
        let xml = wrap("<LEDGER><LEDGERNAME>Bare</LEDGERNAME></LEDGER>");
        let lines = parse_trial_balance(&xml).unwrap();
        let line = &lines[0];
        assert_eq!(line.opening_balance, 0.0);
        assert_eq!(line.total_debit, 0.0);
        assert_eq!(line.total_credit, 0.0);
        assert_eq!(line.closing_balance, 0.0);
    }

    #[test]
    fn test_ledgers_found_at_any_depth() {
        let xml = "<ENVELOPE><BODY><DATA><TALLYMESSAGE><WRAPPER>\
                   <LEDGER><LEDGERNAME>Deep One</LEDGERNAME></LEDGER>\
                   </WRAPPER></TALLYMESSAGE>\
                   <LEDGER><LEDGERNAME>Shallow One</LEDGERNAME></LEDGER>\
                   </DATA></BODY></ENVELOPE>";

        let lines = parse_trial_balance(xml).unwrap();
        // Document order, not nesting order
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Deep One");
        assert_eq!(lines[1].name, "Shallow One");
    }

    #[test]
    fn test_malformed_document_fails_with_preview() {
        let xml = "<ENVELOPE><LEDGER><LEDGERNAME>Broken";
        let err = parse_trial_balance(xml).unwrap_err();
        assert!(err.preview.starts_with("<ENVELOPE>"));
        assert!(err.to_string().contains("not well-formed"));
    }

    #[test]
    fn test_empty_document_yields_no_lines() {
        let lines = parse_trial_balance("<ENVELOPE><BODY></BODY></ENVELOPE>").unwrap();
        assert!(lines.is_empty());
    }
}
