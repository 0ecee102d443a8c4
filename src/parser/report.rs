use crate::error::ScanwiseError;
use crate::models::scan::{NO_DESCRIPTION, UNKNOWN_OS, UNKNOWN_SERVICE, UNKNOWN_VULN_ID};
use crate::models::{Host, Port, ScanResult, Service, Vulnerability};
use crate::parser::markup::{parse_document, Element};
use std::path::Path;
use tracing::debug;

const OPEN_STATE: &str = "open";

/// Converts a scanner's tree-markup report into a [`ScanResult`].
///
/// Only top-level `host` elements with an `address` child are considered,
/// and only their ports whose `state` is exactly `open`. Hosts left with no
/// open ports are dropped.
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    script_findings: bool,
}

impl ReportParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also turn each kept port's `script` children into vulnerabilities.
    pub fn with_script_findings(mut self) -> Self {
        self.script_findings = true;
        self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ScanResult, ScanwiseError> {
        let bytes = std::fs::read(path)?;
        self.parse(&bytes)
    }

    pub fn parse(&self, report: &[u8]) -> Result<ScanResult, ScanwiseError> {
        let root = parse_document(report)?;

        let mut hosts = Vec::new();
        let mut port_count = 0usize;

        for host_elem in root.children_named("host") {
            let Some(address) = host_elem.child("address").and_then(|a| a.attr("addr")) else {
                debug!("skipping host without address");
                continue;
            };

            let mut host = Host::new(address).with_os(read_os_name(host_elem));
            if let Some(hostnames) = host_elem.child("hostnames") {
                for name in hostnames.children_named("hostname").filter_map(|h| h.attr("name")) {
                    host = host.with_hostname(name);
                }
            }

            for port_elem in host_elem.descendants_named("port") {
                if let Some(port) = self.parse_port(port_elem, address)? {
                    host = host.with_port(port);
                    port_count += 1;
                }
            }

            if host.ports.is_empty() {
                debug!(host = %address, "skipping host without open ports");
                continue;
            }

            hosts.push(host);
        }

        debug!(hosts = hosts.len(), ports = port_count, "parsed scan report");
        Ok(ScanResult::from_parts(hosts, port_count))
    }

    fn parse_port(&self, port_elem: &Element, address: &str) -> Result<Option<Port>, ScanwiseError> {
        let state = port_elem.child("state").and_then(|s| s.attr("state"));
        if state != Some(OPEN_STATE) {
            debug!(host = %address, portid = ?port_elem.attr("portid"), state = ?state, "skipping port that is not open");
            return Ok(None);
        }

        let port_id = parse_port_id(port_elem.attr("portid"), address)?;
        let protocol = port_elem.attr("protocol").unwrap_or_default();

        let mut port = Port::new(port_id, protocol).with_service(read_service(port_elem));

        if self.script_findings {
            for script in port_elem.children_named("script") {
                port = port.with_vulnerability(Vulnerability::new(
                    script.attr("id").unwrap_or(UNKNOWN_VULN_ID),
                    script.attr("output").unwrap_or(NO_DESCRIPTION),
                ));
            }
        }

        Ok(Some(port))
    }
}

fn parse_port_id(raw: Option<&str>, address: &str) -> Result<u16, ScanwiseError> {
    let raw = raw.ok_or_else(|| {
        ScanwiseError::malformed(format!("open port on host {} has no portid", address))
    })?;

    raw.trim().parse::<u16>().map_err(|_| {
        ScanwiseError::malformed(format!(
            "portid {:?} on host {} is not a valid port number",
            raw, address
        ))
    })
}

fn read_service(port_elem: &Element) -> Service {
    match port_elem.child("service") {
        Some(service) => Service {
            name: service.attr("name").unwrap_or(UNKNOWN_SERVICE).to_string(),
            product: service.attr("product").unwrap_or_default().to_string(),
            version: service.attr("version").unwrap_or_default().to_string(),
        },
        None => Service::default(),
    }
}

fn read_os_name(host_elem: &Element) -> &str {
    host_elem
        .child("os")
        .and_then(|os| os.child("osmatch"))
        .and_then(|m| m.attr("name"))
        .unwrap_or(UNKNOWN_OS)
}
