use crate::models::{AdvisoryRecord, Extraction, Priority};
use regex::Regex;
use tracing::{debug, warn};

/// Recovers per-vulnerability priority and patch text from free-form
/// advisory output.
///
/// Both searches are case-insensitive and anchor on the vulnerability id,
/// which is always matched as literal text.
pub struct AdvisoryExtractor;

impl AdvisoryExtractor {
    pub fn extract(advisory_text: &str, vuln_id: &str) -> AdvisoryRecord {
        let priority = Self::find_priority(advisory_text, vuln_id);
        let patch = Self::find_patch(advisory_text, vuln_id);

        if !priority.is_matched() || !patch.is_matched() {
            debug!(
                vuln_id,
                priority_found = priority.is_matched(),
                patch_found = patch.is_matched(),
                "advisory text is missing fields for vulnerability"
            );
        }

        AdvisoryRecord::from_extractions(vuln_id, priority, patch)
    }

    /// Looks for `{ <id> , <priority> }`.
    pub fn find_priority(advisory_text: &str, vuln_id: &str) -> Extraction<Priority> {
        let pattern = format!(
            r"(?i)\{{\s*{}\s*,\s*(critical|high|medium|low|unknown)\s*\}}",
            regex::escape(vuln_id)
        );

        let Some(re) = compile(&pattern) else {
            return Extraction::NotFound;
        };

        re.captures(advisory_text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Priority::from_token(m.as_str()))
            .into()
    }

    /// Looks for `Patches: [ <id> , <content> ]`, stopping at the nearest `]`.
    pub fn find_patch(advisory_text: &str, vuln_id: &str) -> Extraction<String> {
        let pattern = format!(
            r"(?is)Patches:\s*\[\s*{}\s*,(.*?)\]",
            regex::escape(vuln_id)
        );

        let Some(re) = compile(&pattern) else {
            return Extraction::NotFound;
        };

        re.captures(advisory_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .into()
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "could not build advisory pattern");
            None
        }
    }
}
