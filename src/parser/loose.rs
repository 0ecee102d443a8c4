//! Loader for the loosely-typed JSON scan shape produced by enrichment
//! tools: hosts carrying ports that already list their vulnerabilities.
//!
//! Every field is optional on the wire; defaults and host-drop rules are the
//! same ones the markup parser applies.

use crate::error::ScanwiseError;
use crate::models::scan::{NO_DESCRIPTION, UNKNOWN_OS, UNKNOWN_SERVICE, UNKNOWN_VULN_ID};
use crate::models::{Host, Port, ScanResult, Service, Vulnerability};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LooseScan {
    #[serde(default)]
    hosts: Vec<LooseHost>,
}

#[derive(Debug, Deserialize)]
struct LooseHost {
    #[serde(alias = "ip")]
    address: Option<String>,
    #[serde(default)]
    hostnames: Vec<String>,
    os: Option<LooseOs>,
    #[serde(default)]
    ports: Vec<LoosePort>,
}

#[derive(Debug, Deserialize)]
struct LooseOs {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoosePort {
    #[serde(alias = "port", alias = "port_id")]
    portid: Option<Value>,
    protocol: Option<String>,
    service: Option<LooseService>,
    #[serde(default)]
    vulnerabilities: Vec<LooseVulnerability>,
}

#[derive(Debug, Deserialize)]
struct LooseService {
    name: Option<String>,
    product: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LooseVulnerability {
    id: Option<String>,
    output: Option<String>,
}

pub fn load_scan_json_file(path: &Path) -> Result<ScanResult, ScanwiseError> {
    let bytes = std::fs::read(path)?;
    load_scan_json(&bytes)
}

pub fn load_scan_json(bytes: &[u8]) -> Result<ScanResult, ScanwiseError> {
    let scan: LooseScan = serde_json::from_slice(bytes)
        .map_err(|e| ScanwiseError::malformed(format!("invalid scan JSON: {}", e)))?;

    let mut hosts = Vec::with_capacity(scan.hosts.len());
    for loose in scan.hosts {
        let Some(address) = loose.address else {
            debug!("skipping host without address");
            continue;
        };

        let os_name = loose
            .os
            .and_then(|os| os.name)
            .unwrap_or_else(|| UNKNOWN_OS.to_string());

        let mut host = Host::new(address.clone()).with_os(os_name);
        for hostname in loose.hostnames {
            host = host.with_hostname(hostname);
        }

        for port in loose.ports {
            host = host.with_port(convert_port(port, &address)?);
        }

        hosts.push(host);
    }

    Ok(ScanResult::from_hosts(hosts))
}

fn convert_port(loose: LoosePort, address: &str) -> Result<Port, ScanwiseError> {
    let port_id = match &loose.portid {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ScanwiseError::malformed(format!(
            "port id {} on host {} is not a valid port number",
            loose.portid.as_ref().map(Value::to_string).unwrap_or_else(|| "(missing)".into()),
            address
        ))
    })?;

    let service = match loose.service {
        Some(s) => Service {
            name: s.name.unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
            product: s.product.unwrap_or_default(),
            version: s.version.unwrap_or_default(),
        },
        None => Service::default(),
    };

    let mut port = Port::new(port_id, loose.protocol.unwrap_or_default()).with_service(service);
    for vuln in loose.vulnerabilities {
        port = port.with_vulnerability(Vulnerability::new(
            vuln.id.unwrap_or_else(|| UNKNOWN_VULN_ID.to_string()),
            vuln.output.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        ));
    }

    Ok(port)
}
