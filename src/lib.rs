pub mod analyzer;
pub mod cli;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;

pub use error::ScanwiseError;

// Re-export commonly used types
pub use models::{
    AdvisoryRecord, Extraction, Host, Port, Priority, ScanResult, Service, Vulnerability,
    VulnerabilityRow, WorkflowStatus,
};

pub use analyzer::{AdvisoryExtractor, ContextFlattener, RecordAggregator};
pub use parser::ReportParser;
pub use storage::{AdvisoryLog, CsvLedger};

pub use cli::CliHandler;
