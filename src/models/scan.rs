//! Normalized scan data: hosts, their open ports, services and findings.
//!
//! A [`ScanResult`] is built once by a parser and never mutated afterwards.
//! Both the markup parser and the loose JSON loader produce this single
//! shape; `vulnerabilities` is simply empty when nothing upstream supplied
//! script findings.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_OS: &str = "Unknown OS";
pub const UNKNOWN_SERVICE: &str = "unknown";
pub const UNKNOWN_VULN_ID: &str = "unknown-id";
pub const NO_DESCRIPTION: &str = "No description";
pub const NO_HOSTNAME: &str = "No hostname";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub host_count: usize,
    pub port_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    #[serde(rename = "scan_summary")]
    summary: ScanSummary,
    hosts: Vec<Host>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub hostnames: Vec<String>,
    pub os_name: String,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub port_id: u16,
    pub protocol: String,
    pub service: Service,
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub product: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub output: String,
}

impl ScanResult {
    /// Assemble a result from already-filtered hosts and the port count
    /// accumulated while parsing them.
    pub(crate) fn from_parts(hosts: Vec<Host>, port_count: usize) -> Self {
        debug_assert!(hosts.iter().all(|h| !h.ports.is_empty()));
        Self {
            summary: ScanSummary {
                host_count: hosts.len(),
                port_count,
            },
            hosts,
        }
    }

    /// Build a result from arbitrary hosts, dropping any host without ports
    /// and deriving the summary from what remains.
    pub fn from_hosts(hosts: Vec<Host>) -> Self {
        let hosts: Vec<Host> = hosts.into_iter().filter(|h| !h.ports.is_empty()).collect();
        let port_count = hosts.iter().map(|h| h.ports.len()).sum();
        Self::from_parts(hosts, port_count)
    }

    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn vulnerability_count(&self) -> usize {
        self.findings().count()
    }

    /// Every (host, port, vulnerability) triple in document order.
    pub fn findings(&self) -> impl Iterator<Item = (&Host, &Port, &Vulnerability)> {
        self.hosts.iter().flat_map(|host| {
            host.ports.iter().flat_map(move |port| {
                port.vulnerabilities
                    .iter()
                    .map(move |vuln| (host, port, vuln))
            })
        })
    }
}

impl Host {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostnames: Vec::new(),
            os_name: UNKNOWN_OS.to_string(),
            ports: Vec::new(),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        if !self.hostnames.contains(&hostname) {
            self.hostnames.push(hostname);
        }
        self
    }

    pub fn with_os(mut self, os_name: impl Into<String>) -> Self {
        self.os_name = os_name.into();
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Hostnames joined for display, or the "No hostname" placeholder.
    pub fn hostname_display(&self) -> String {
        if self.hostnames.is_empty() {
            NO_HOSTNAME.to_string()
        } else {
            self.hostnames.join(", ")
        }
    }
}

impl Port {
    pub fn new(port_id: u16, protocol: impl Into<String>) -> Self {
        Self {
            port_id,
            protocol: protocol.into(),
            service: Service::default(),
            vulnerabilities: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = service;
        self
    }

    pub fn with_vulnerability(mut self, vulnerability: Vulnerability) -> Self {
        self.vulnerabilities.push(vulnerability);
        self
    }
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: UNKNOWN_SERVICE.to_string(),
            product: String::new(),
            version: String::new(),
        }
    }
}

impl Service {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Vulnerability {
    pub fn new(id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: output.into(),
        }
    }
}
