use crate::error::ScanwiseError;
use crate::models::advisory::Priority;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column headers of the vulnerability ledger, in row order.
pub const LEDGER_COLUMNS: [&str; 11] = [
    "Timestamp",
    "Host",
    "Hostname",
    "OS",
    "ID",
    "Port",
    "Service",
    "Vulnerability",
    "Patch/Mitigation",
    "Priority",
    "Status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Patched,
}

/// One ledger row per (host, port, vulnerability) occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRow {
    pub timestamp: DateTime<Local>,
    pub host: String,
    pub hostnames: String,
    pub os_name: String,
    pub vuln_id: String,
    pub port_id: u16,
    pub service: String,
    pub description: String,
    pub patch: String,
    pub priority: Priority,
    pub status: WorkflowStatus,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 3] = [
        WorkflowStatus::Pending,
        WorkflowStatus::InProgress,
        WorkflowStatus::Patched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "Pending",
            WorkflowStatus::InProgress => "In Progress",
            WorkflowStatus::Patched => "Patched",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, ScanwiseError> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "pending" => Ok(WorkflowStatus::Pending),
            "inprogress" => Ok(WorkflowStatus::InProgress),
            "patched" => Ok(WorkflowStatus::Patched),
            _ => Err(ScanwiseError::Storage(format!("Unknown workflow status: {}", s))),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VulnerabilityRow {
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Field values in [`LEDGER_COLUMNS`] order.
    pub fn fields(&self) -> [String; 11] {
        [
            self.formatted_timestamp(),
            self.host.clone(),
            self.hostnames.clone(),
            self.os_name.clone(),
            self.vuln_id.clone(),
            self.port_id.to_string(),
            self.service.clone(),
            self.description.clone(),
            self.patch.clone(),
            self.priority.to_string(),
            self.status.to_string(),
        ]
    }
}
