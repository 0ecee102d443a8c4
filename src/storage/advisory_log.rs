use crate::error::ScanwiseError;
use crate::models::TIMESTAMP_FORMAT;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 80;

/// Raw advisory text, appended to one log file per calendar day.
#[derive(Debug, Clone)]
pub struct AdvisoryLog {
    dir: PathBuf,
}

impl AdvisoryLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, timestamp: &DateTime<Local>) -> PathBuf {
        self.dir
            .join(format!("vulnerability_log_{}.txt", timestamp.format("%Y-%m-%d")))
    }

    pub fn append(&self, advisory_text: &str, timestamp: DateTime<Local>) -> Result<PathBuf, ScanwiseError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&timestamp);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(format_block(advisory_text, &timestamp).as_bytes())?;

        info!(path = %path.display(), "appended advisory to log");
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn format_block(advisory_text: &str, timestamp: &DateTime<Local>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{rule}\nTimestamp: {}\n\nNmap Scan Results:\n{}\n{rule}\n\n",
        timestamp.format(TIMESTAMP_FORMAT),
        advisory_text,
    )
}
