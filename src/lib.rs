// Tally Trial Balance Extractor - Core Library
// Exposes the extraction pipeline for the CLI, tests, and embedding UIs

pub mod amount;
pub mod classify;
pub mod connector;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod records;

// Re-export commonly used types
pub use amount::parse_amount;
pub use classify::{classify_line, derive_classification, ledger_key};
pub use connector::{trial_balance_envelope, LedgerSource, TallyConnector};
pub use export::{default_filename, write_csv, write_csv_file, write_json, write_json_file};
pub use parser::{parse_trial_balance, ResponseParseError};
pub use pipeline::{
    closing_by_classification, filter_zero_rows, ExtractError, ExtractOptions, Extraction,
    ExtractionPipeline, Totals,
};
pub use records::{Classification, LedgerRow, Period, TrialBalanceLine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
