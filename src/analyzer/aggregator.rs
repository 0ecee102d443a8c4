use crate::analyzer::extractor::AdvisoryExtractor;
use crate::models::{Priority, ScanResult, VulnerabilityRow, WorkflowStatus};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// Joins scan findings with the fields extracted from advisory text.
pub struct RecordAggregator;

impl RecordAggregator {
    /// One fresh `Pending` row per (host, port, vulnerability), stamped with
    /// the time of this call. Repeated calls produce repeated rows.
    pub fn aggregate(result: &ScanResult, advisory_text: &str) -> Vec<VulnerabilityRow> {
        Self::aggregate_at(result, advisory_text, Local::now())
    }

    pub fn aggregate_at(
        result: &ScanResult,
        advisory_text: &str,
        timestamp: DateTime<Local>,
    ) -> Vec<VulnerabilityRow> {
        result
            .findings()
            .map(|(host, port, vuln)| {
                let advisory = AdvisoryExtractor::extract(advisory_text, &vuln.id);

                VulnerabilityRow {
                    timestamp,
                    host: host.address.clone(),
                    hostnames: host.hostname_display(),
                    os_name: host.os_name.clone(),
                    vuln_id: vuln.id.clone(),
                    port_id: port.port_id,
                    service: port.service.name.clone(),
                    description: vuln.output.clone(),
                    patch: advisory.patch,
                    priority: advisory.priority,
                    status: WorkflowStatus::Pending,
                }
            })
            .collect()
    }

    /// Row counts per priority, highest first.
    pub fn priority_breakdown(rows: &[VulnerabilityRow]) -> Vec<(Priority, usize)> {
        let mut counts: BTreeMap<Priority, usize> = BTreeMap::new();
        for row in rows {
            *counts.entry(row.priority).or_insert(0) += 1;
        }
        counts.into_iter().rev().collect()
    }
}
