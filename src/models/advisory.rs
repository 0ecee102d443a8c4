use serde::{Deserialize, Serialize};
use std::fmt;

pub const PATCH_NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

/// Outcome of one anchored search over advisory text.
///
/// A miss is an ordinary result, not an error; sentinels are only applied
/// when the outcome is turned into an [`AdvisoryRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    Matched(T),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    pub vuln_id: String,
    pub priority: Priority,
    pub patch: String,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown => "Unknown",
        }
    }

    /// Case-insensitive lookup of a priority token.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> Extraction<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Extraction::Matched(_))
    }

    pub fn unwrap_or(self, sentinel: T) -> T {
        match self {
            Extraction::Matched(value) => value,
            Extraction::NotFound => sentinel,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Extraction::Matched(value) => Some(value),
            Extraction::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Extraction<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Extraction::Matched(value),
            None => Extraction::NotFound,
        }
    }
}

impl AdvisoryRecord {
    /// Map both search outcomes onto their sentinels.
    pub fn from_extractions(
        vuln_id: impl Into<String>,
        priority: Extraction<Priority>,
        patch: Extraction<String>,
    ) -> Self {
        Self {
            vuln_id: vuln_id.into(),
            priority: priority.unwrap_or(Priority::Unknown),
            patch: patch.unwrap_or(PATCH_NOT_SPECIFIED.to_string()),
        }
    }

    pub fn has_patch(&self) -> bool {
        self.patch != PATCH_NOT_SPECIFIED
    }
}
