// Parser module - turns scan input (markup reports or loose JSON) into ScanResult

pub mod loose;
pub mod markup;
pub mod report;

pub use loose::{load_scan_json, load_scan_json_file};
pub use report::ReportParser;

use crate::error::ScanwiseError;
use crate::models::ScanResult;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Markup,
    Json,
}

impl InputFormat {
    /// A `.json` extension or a leading `{` selects JSON; anything else is
    /// treated as a markup report.
    pub fn detect(path: &Path, content: &[u8]) -> Self {
        let has_json_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let starts_with_brace = content
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map(|b| *b == b'{')
            .unwrap_or(false);

        if has_json_extension || starts_with_brace {
            InputFormat::Json
        } else {
            InputFormat::Markup
        }
    }
}

/// Read a scan input from disk, whichever format it is in.
pub fn load_scan(path: &Path, parser: &ReportParser) -> Result<ScanResult, ScanwiseError> {
    let content = std::fs::read(path)?;
    match InputFormat::detect(path, &content) {
        InputFormat::Json => load_scan_json(&content),
        InputFormat::Markup => parser.parse(&content),
    }
}
