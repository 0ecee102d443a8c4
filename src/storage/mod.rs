// Storage module - append-only persistence of ledger rows and raw advisories

pub mod advisory_log;
pub mod ledger;

pub use advisory_log::AdvisoryLog;
pub use ledger::{CsvLedger, LedgerSummary, LEDGER_FILE_NAME};
