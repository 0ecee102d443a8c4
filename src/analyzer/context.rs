use crate::models::{Host, Port, ScanResult, Vulnerability};

pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Renders scan findings as plain-text context for the advisory prompt.
pub struct ContextFlattener;

impl ContextFlattener {
    /// One block per (host, port, vulnerability), in nested document order,
    /// separated by a blank line. Ports without vulnerabilities contribute
    /// nothing.
    pub fn flatten(result: &ScanResult) -> String {
        Self::blocks(result).join(BLOCK_SEPARATOR)
    }

    /// The per-finding blocks `flatten` joins. A block may itself contain
    /// blank lines when the scanner output does.
    pub fn blocks(result: &ScanResult) -> Vec<String> {
        result
            .findings()
            .map(|(host, port, vuln)| Self::format_block(host, port, vuln))
            .collect()
    }

    pub fn format_block(host: &Host, port: &Port, vuln: &Vulnerability) -> String {
        format!(
            "Host: {} ({})\nOS: {}\nPort {} ({})\nVulnerability ID: {}\nDetails: {}",
            host.address,
            host.hostname_display(),
            host.os_name,
            port.port_id,
            port.service.name,
            vuln.id,
            vuln.output
        )
    }
}
