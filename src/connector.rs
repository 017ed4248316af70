// 🔌 Tally Connector - HTTP/XML protocol client
// Two-step protocol: an identity probe ($$CurrentCompany) followed by a
// TDL collection request for the trial balance lines. Calls are
// synchronous and never retried; the pipeline decides what a failure
// means.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use std::time::Duration;

/// Envelope for the identity probe: asks Tally which company is open.
const COMPANY_PROBE_ENVELOPE: &str = "\
<ENVELOPE>
    <HEADER>
        <VERSION>1</VERSION>
        <TALLYREQUEST>Export</TALLYREQUEST>
        <TYPE>Function</TYPE>
        <ID>$$CurrentCompany</ID>
    </HEADER>
    <BODY></BODY>
</ENVELOPE>";

/// Build the trial balance collection request for a date range.
///
/// Dates are DD-MM-YYYY and passed through exactly as supplied - Tally is
/// the authority on what ranges are valid. The TDL message declares the
/// ledger collection and the field schema the parser expects back.
pub fn trial_balance_envelope(from_date: &str, to_date: &str) -> String {
    format!(
        "\
<ENVELOPE>
    <HEADER>
        <VERSION>1</VERSION>
        <TALLYREQUEST>Export</TALLYREQUEST>
        <TYPE>Collection</TYPE>
        <ID>TrialBalanceCollection</ID>
    </HEADER>
    <BODY>
        <DESC>
            <STATICVARIABLES>
                <SVEXPORTFORMAT>$$SysName:XML</SVEXPORTFORMAT>
                <SVFROMDATE>{from_date}</SVFROMDATE>
                <SVTODATE>{to_date}</SVTODATE>
            </STATICVARIABLES>
            <TDL>
                <TDLMESSAGE>
                    <COLLECTION NAME=\"TrialBalanceCollection\" ISMODIFY=\"No\">
                        <TYPE>Ledger</TYPE>
                        <NATIVEMETHOD>Name</NATIVEMETHOD>
                        <NATIVEMETHOD>Parent</NATIVEMETHOD>
                        <NATIVEMETHOD>OpeningBalance</NATIVEMETHOD>
                        <NATIVEMETHOD>ClosingBalance</NATIVEMETHOD>
                        <NATIVEMETHOD>IsRevenue</NATIVEMETHOD>
                    </COLLECTION>

                    <PART NAME=\"TBExport\">
                        <TOPPARTS>TBExport</TOPPARTS>
                        <XMLTAG>ENVELOPE</XMLTAG>
                    </PART>

                    <LINE NAME=\"TBLine\">
                        <FIELDS>FldName, FldParent, FldPrimaryGroup</FIELDS>
                        <FIELDS>FldOpening, FldDebit, FldCredit, FldClosing</FIELDS>
                        <FIELDS>FldIsRevenue</FIELDS>
                    </LINE>

                    <FIELD NAME=\"FldName\">
                        <SET>$Name</SET>
                        <XMLTAG>LEDGERNAME</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldParent\">
                        <SET>$Parent</SET>
                        <XMLTAG>PARENT</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldPrimaryGroup\">
                        <SET>$$PrimaryGroup:$Name</SET>
                        <XMLTAG>PRIMARYGROUP</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldOpening\">
                        <SET>$OpeningBalance</SET>
                        <XMLTAG>OPENINGBALANCE</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldDebit\">
                        <SET>$$TotDebit:$Name</SET>
                        <XMLTAG>TOTALDEBIT</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldCredit\">
                        <SET>$$TotCredit:$Name</SET>
                        <XMLTAG>TOTALCREDIT</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldClosing\">
                        <SET>$ClosingBalance</SET>
                        <XMLTAG>CLOSINGBALANCE</XMLTAG>
                    </FIELD>

                    <FIELD NAME=\"FldIsRevenue\">
                        <SET>$IsRevenue</SET>
                        <XMLTAG>ISREVENUE</XMLTAG>
                    </FIELD>
                </TDLMESSAGE>
            </TDL>
        </DESC>
    </BODY>
</ENVELOPE>"
    )
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Anything that can answer the probe-then-fetch protocol.
///
/// `TallyConnector` is the production implementation; tests drive the
/// pipeline with an in-memory source instead of a live Tally.
pub trait LedgerSource {
    /// Identity probe. Returns true when the endpoint answered; the
    /// company name (if any) becomes available afterwards. Never
    /// escalates a transport failure.
    fn test_connection(&mut self) -> bool;

    /// Company name discovered by the last successful probe.
    fn company_name(&self) -> Option<&str>;

    /// Fetch the raw trial balance XML for a DD-MM-YYYY date range.
    /// A non-200 answer is a hard failure for the call.
    fn fetch_trial_balance(&self, from_date: &str, to_date: &str) -> Result<String>;
}

// ============================================================================
// TALLY CONNECTOR
// ============================================================================

/// HTTP client for Tally's XML server (F12 > Advanced Configuration >
/// Allow ODBC/XML Server).
pub struct TallyConnector {
    base_url: String,
    client: reqwest::blocking::Client,
    company_name: Option<String>,

    /// Identity probe timeout; the probe is a tiny exchange.
    pub probe_timeout: Duration,

    /// Data request timeout; a full chart of accounts can take a while
    /// to stream out of Tally.
    pub fetch_timeout: Duration,
}

impl TallyConnector {
    pub fn new(host: &str, port: u16) -> Self {
        TallyConnector {
            base_url: format!("http://{}:{}", host, port),
            client: reqwest::blocking::Client::new(),
            company_name: None,
            probe_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(120),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_envelope(
        &self,
        envelope: String,
        timeout: Duration,
    ) -> reqwest::Result<reqwest::blocking::Response> {
        self.client
            .post(&self.base_url)
            .header("Content-Type", "application/xml")
            .timeout(timeout)
            .body(envelope)
            .send()
    }
}

impl LedgerSource for TallyConnector {
    fn test_connection(&mut self) -> bool {
        let response = match self.post_envelope(COMPANY_PROBE_ENVELOPE.to_string(), self.probe_timeout)
        {
            Ok(response) => response,
            Err(_) => return false,
        };

        if response.status() != StatusCode::OK {
            return false;
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(_) => return false,
        };

        // The probe answers with a bare document whose root text is the
        // company name.
        match roxmltree::Document::parse(&body) {
            Ok(doc) => {
                self.company_name = doc
                    .root_element()
                    .text()
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty());
                true
            }
            Err(_) => false,
        }
    }

    fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    fn fetch_trial_balance(&self, from_date: &str, to_date: &str) -> Result<String> {
        let envelope = trial_balance_envelope(from_date, to_date);

        let response = self
            .post_envelope(envelope, self.fetch_timeout)
            .with_context(|| format!("trial balance request to {} failed", self.base_url))?;

        let status = response.status();
        if status != StatusCode::OK {
            bail!("trial balance request returned HTTP {}", status);
        }

        response
            .text()
            .context("failed to read trial balance response body")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_envelope_requests_current_company() {
        assert!(COMPANY_PROBE_ENVELOPE.contains("<ID>$$CurrentCompany</ID>"));
        assert!(COMPANY_PROBE_ENVELOPE.contains("<TYPE>Function</TYPE>"));
    }

    #[test]
    fn test_trial_balance_envelope_carries_the_date_range() {
        let envelope = trial_balance_envelope("01-04-2024", "31-03-2025");
        assert!(envelope.contains("<SVFROMDATE>01-04-2024</SVFROMDATE>"));
        assert!(envelope.contains("<SVTODATE>31-03-2025</SVTODATE>"));
    }

    #[test]
    fn test_trial_balance_envelope_declares_the_collection_schema() {
        let envelope = trial_balance_envelope("01-04-2024", "31-03-2025");
        assert!(envelope.contains("<ID>TrialBalanceCollection</ID>"));
        assert!(envelope.contains("<TYPE>Ledger</TYPE>"));
        for tag in [
            "LEDGERNAME",
            "PARENT",
            "PRIMARYGROUP",
            "OPENINGBALANCE",
            "TOTALDEBIT",
            "TOTALCREDIT",
            "CLOSINGBALANCE",
            "ISREVENUE",
        ] {
            assert!(
                envelope.contains(&format!("<XMLTAG>{}</XMLTAG>", tag)),
                "missing field tag {}",
                tag
            );
        }
    }

    #[test]
    fn test_connector_builds_the_base_url() {
        let connector = TallyConnector::new("localhost", 9000);
        assert_eq!(connector.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_fetch_timeout_is_materially_longer_than_probe() {
        let connector = TallyConnector::new("localhost", 9000);
        assert!(connector.fetch_timeout >= connector.probe_timeout * 10);
    }
}
