// 💱 Amount Normalizer - Tally money strings to signed values
// Handles tokens like "1,00,000.00 Dr" and "50,000.00 Cr".

/// Parse a Tally amount token into a signed value.
///
/// Tally reports balances with digit grouping and a Dr/Cr suffix instead
/// of a sign: credits (liabilities, income, equity) come back negative,
/// debits (assets, expenses) positive. A bare number keeps whatever sign
/// it already carries.
///
/// One corrupt field must never abort a whole extraction, so anything
/// unparseable is 0.0 and the caller is not bothered.
pub fn parse_amount(raw: &str) -> f64 {
    // Drop grouping separators and interior whitespace up front; the
    // suffix check works on the compacted token.
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let lower = cleaned.to_lowercase();

    let (numeric, negate) = if let Some(rest) = lower
        .strip_suffix("cr.")
        .or_else(|| lower.strip_suffix("cr"))
    {
        (rest, true)
    } else if let Some(rest) = lower
        .strip_suffix("dr.")
        .or_else(|| lower.strip_suffix("dr"))
    {
        (rest, false)
    } else {
        (lower.as_str(), false)
    };

    match numeric.parse::<f64>() {
        Ok(value) if negate => -value,
        Ok(value) => value,
        Err(_) => 0.0,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_suffix_negates() {
        assert_eq!(parse_amount("1,00,000.00 Cr"), -100000.0);
        assert_eq!(parse_amount("500 Cr"), -500.0);
    }

    #[test]
    fn test_debit_suffix_keeps_magnitude() {
        assert_eq!(parse_amount("50,000.00 Dr"), 50000.0);
        assert_eq!(parse_amount("75.25 Dr"), 75.25);
    }

    #[test]
    fn test_suffix_with_trailing_period() {
        assert_eq!(parse_amount("2,500.75 Cr."), -2500.75);
        assert_eq!(parse_amount("2,500.75 Dr."), 2500.75);
    }

    #[test]
    fn test_suffix_is_case_insensitive() {
        assert_eq!(parse_amount("100 CR"), -100.0);
        assert_eq!(parse_amount("100 cr"), -100.0);
        assert_eq!(parse_amount("100 dR"), 100.0);
    }

    #[test]
    fn test_bare_number_keeps_its_sign() {
        assert_eq!(parse_amount("1,234.5"), 1234.5);
        assert_eq!(parse_amount("-1,234.50"), -1234.5);
        assert_eq!(parse_amount("0"), 0.0);
    }

    #[test]
    fn test_indian_grouping_and_whitespace() {
        assert_eq!(parse_amount("12,34,567.89"), 1234567.89);
        assert_eq!(parse_amount("  1 000.50  "), 1000.5);
    }

    #[test]
    fn test_malformed_input_defaults_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("Dr"), 0.0);
        assert_eq!(parse_amount("12.34.56 Cr"), 0.0);
    }
}
