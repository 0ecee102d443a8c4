use crate::error::ScanwiseError;
use crate::models::{Priority, VulnerabilityRow, WorkflowStatus, LEDGER_COLUMNS};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const LEDGER_FILE_NAME: &str = "Vulnerability_logs.csv";

const PRIORITY_COLUMN: usize = 9;
const STATUS_COLUMN: usize = 10;

/// Append-only CSV ledger of vulnerability rows.
///
/// Fields are stored verbatim except one that starts like a spreadsheet
/// formula (`=`, `@`, or `+`/`-` directly followed by text), which is stored
/// with a leading `'`.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

/// Row tallies read back from a ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_rows: usize,
    pub by_priority: BTreeMap<Priority, usize>,
    pub by_status: BTreeMap<WorkflowStatus, usize>,
    pub skipped_rows: usize,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LEDGER_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the header first if the ledger file is new.
    /// Returns the number of rows written.
    pub fn append(&self, rows: &[VulnerabilityRow]) -> Result<usize, ScanwiseError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_exists = self.path.exists();
        let mut out = String::new();

        if !file_exists {
            out.push_str(&LEDGER_COLUMNS.join(","));
            out.push_str("\r\n");
        }

        for row in rows {
            let fields: Vec<String> = row.fields().iter().map(|f| csv_escape(f)).collect();
            out.push_str(&fields.join(","));
            out.push_str("\r\n");
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(out.as_bytes())?;

        info!(path = %self.path.display(), rows = rows.len(), "appended ledger rows");
        Ok(rows.len())
    }

    pub fn summarize(&self) -> Result<LedgerSummary, ScanwiseError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ScanwiseError::Storage(format!("cannot read ledger {}: {}", self.path.display(), e))
        })?;

        let mut summary = LedgerSummary::default();

        for record in parse_records(&content) {
            if record.first().map(String::as_str) == Some(LEDGER_COLUMNS[0]) {
                continue;
            }

            if record.len() <= STATUS_COLUMN {
                summary.skipped_rows += 1;
                continue;
            }

            let status = match WorkflowStatus::from_str(&record[STATUS_COLUMN]) {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "skipping ledger row");
                    summary.skipped_rows += 1;
                    continue;
                }
            };
            let priority = Priority::from_token(&record[PRIORITY_COLUMN]).unwrap_or(Priority::Unknown);

            summary.total_rows += 1;
            *summary.by_priority.entry(priority).or_insert(0) += 1;
            *summary.by_status.entry(status).or_insert(0) += 1;
        }

        Ok(summary)
    }
}

fn csv_escape(s: &str) -> String {
    let needs_quoting = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');

    if starts_like_formula(s) {
        // Neutralize spreadsheet formula interpretation
        format!("\"'{}\"", s.replace('"', "\"\""))
    } else if needs_quoting {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// `=`, `@`, tab and CR always start a formula. `+` and `-` only count when
/// glued to what follows, so list bullets like `- apt upgrade` stay as is.
fn starts_like_formula(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some('=' | '@' | '\t' | '\r') => true,
        Some('+' | '-') => chars.next().map_or(false, |c| !c.is_whitespace()),
        _ => false,
    }
}

/// Split CSV text into records, honouring quoted fields that contain
/// separators, doubled quotes or line breaks.
fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}
