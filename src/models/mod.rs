pub mod advisory;
pub mod record;
pub mod scan;

pub use advisory::{AdvisoryRecord, Extraction, Priority, PATCH_NOT_SPECIFIED};
pub use record::{VulnerabilityRow, WorkflowStatus, LEDGER_COLUMNS, TIMESTAMP_FORMAT};
pub use scan::{Host, Port, ScanResult, ScanSummary, Service, Vulnerability};
