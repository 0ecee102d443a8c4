use scanwise::error::ScanwiseError;
use scanwise::parser::{load_scan_json, ReportParser};

const MIXED_STATES: &str = r#"<?xml version="1.0"?>
<nmaprun>
  <host>
    <address addr="192.168.1.10" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open"/>
        <service name="ssh" product="OpenSSH" version="8.9p1"/>
      </port>
      <port protocol="tcp" portid="23">
        <state state="closed"/>
        <service name="telnet"/>
      </port>
      <port protocol="tcp" portid="25">
        <service name="smtp"/>
      </port>
    </ports>
  </host>
</nmaprun>"#;

#[test]
fn only_open_ports_are_kept_and_counted() {
    let result = ReportParser::new().parse(MIXED_STATES.as_bytes()).unwrap();

    assert_eq!(result.summary().host_count, 1);
    assert_eq!(result.summary().port_count, 1);

    let host = &result.hosts()[0];
    assert_eq!(host.address, "192.168.1.10");
    assert_eq!(host.ports.len(), 1);

    let port = &host.ports[0];
    assert_eq!(port.port_id, 22);
    assert_eq!(port.protocol, "tcp");
    assert_eq!(port.service.name, "ssh");
    assert_eq!(port.service.product, "OpenSSH");
    assert_eq!(port.service.version, "8.9p1");
    assert!(port.vulnerabilities.is_empty());
}

#[test]
fn open_state_is_case_sensitive() {
    let report = r#"<nmaprun><host><address addr="10.0.0.5"/>
        <ports><port protocol="tcp" portid="80"><state state="Open"/></port></ports>
    </host></nmaprun>"#;

    let result = ReportParser::new().parse(report.as_bytes()).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.summary().port_count, 0);
}

#[test]
fn host_without_address_is_never_present() {
    let report = r#"<nmaprun>
      <host>
        <ports>
          <port protocol="tcp" portid="80"><state state="open"/></port>
          <port protocol="tcp" portid="443"><state state="open"/></port>
        </ports>
      </host>
      <host>
        <address addr="10.0.0.2"/>
        <ports><port protocol="udp" portid="53"><state state="open"/><service name="domain"/></port></ports>
      </host>
    </nmaprun>"#;

    let result = ReportParser::new().parse(report.as_bytes()).unwrap();

    assert_eq!(result.summary().host_count, 1);
    assert_eq!(result.summary().port_count, 1);
    assert_eq!(result.hosts()[0].address, "10.0.0.2");
}

#[test]
fn hosts_without_open_ports_are_dropped() {
    let report = r#"<nmaprun>
      <host><address addr="10.0.0.1"/><ports><port protocol="tcp" portid="1"><state state="filtered"/></port></ports></host>
      <host><address addr="10.0.0.2"/></host>
      <host><address addr="10.0.0.3"/><ports><port protocol="tcp" portid="8080"><state state="open"/></port></ports></host>
    </nmaprun>"#;

    let result = ReportParser::new().parse(report.as_bytes()).unwrap();

    assert_eq!(result.summary().host_count, result.hosts().len());
    assert!(result.hosts().iter().all(|h| !h.ports.is_empty()));
    assert_eq!(result.hosts()[0].address, "10.0.0.3");
}

#[test]
fn missing_attributes_fall_back_to_defaults() {
    let report = r#"<nmaprun><host><address addr="10.0.0.9"/>
        <ports>
          <port portid="5000"><state state="open"/></port>
          <port protocol="tcp" portid="5001"><state state="open"/><service product="nginx"/></port>
        </ports>
    </host></nmaprun>"#;

    let result = ReportParser::new().parse(report.as_bytes()).unwrap();
    let host = &result.hosts()[0];

    assert_eq!(host.os_name, "Unknown OS");
    assert!(host.hostnames.is_empty());
    assert_eq!(host.ports[0].protocol, "");
    assert_eq!(host.ports[0].service.name, "unknown");
    assert_eq!(host.ports[1].service.name, "unknown");
    assert_eq!(host.ports[1].service.product, "nginx");
}

#[test]
fn hostnames_and_os_are_read() {
    let report = r#"<nmaprun><host>
        <address addr="45.33.32.156"/>
        <hostnames>
          <hostname name="scanme.nmap.org" type="user"/>
          <hostname name="scanme.nmap.org" type="PTR"/>
          <hostname name="alt.example" type="PTR"/>
        </hostnames>
        <ports><port protocol="tcp" portid="22"><state state="open"/></port></ports>
        <os><osmatch name="Linux 5.4" accuracy="98"/><osmatch name="Linux 4.15" accuracy="90"/></os>
    </host></nmaprun>"#;

    let result = ReportParser::new().parse(report.as_bytes()).unwrap();
    let host = &result.hosts()[0];

    assert_eq!(host.hostnames, vec!["scanme.nmap.org", "alt.example"]);
    assert_eq!(host.os_name, "Linux 5.4");
}

#[test]
fn script_output_becomes_vulnerabilities_only_when_enabled() {
    let report = r#"<nmaprun><host><address addr="10.1.1.1"/>
        <ports><port protocol="tcp" portid="21">
          <state state="open"/>
          <service name="ftp" product="vsftpd" version="2.3.4"/>
          <script id="ftp-vsftpd-backdoor" output="VULNERABLE: vsFTPd 2.3.4 backdoor"/>
          <script output="anonymous login allowed"/>
        </port></ports>
    </host></nmaprun>"#;

    let plain = ReportParser::new().parse(report.as_bytes()).unwrap();
    assert_eq!(plain.vulnerability_count(), 0);

    let enriched = ReportParser::new()
        .with_script_findings()
        .parse(report.as_bytes())
        .unwrap();
    let vulns = &enriched.hosts()[0].ports[0].vulnerabilities;

    assert_eq!(vulns.len(), 2);
    assert_eq!(vulns[0].id, "ftp-vsftpd-backdoor");
    assert_eq!(vulns[0].output, "VULNERABLE: vsFTPd 2.3.4 backdoor");
    assert_eq!(vulns[1].id, "unknown-id");
}

#[test]
fn malformed_markup_fails_the_whole_parse() {
    let err = ReportParser::new()
        .parse(b"<nmaprun><host><address addr=\"10.0.0.1\"/>")
        .unwrap_err();
    assert!(matches!(err, ScanwiseError::MalformedReport(_)));
}

#[test]
fn non_numeric_port_id_on_open_port_is_fatal() {
    let report = r#"<nmaprun>
      <host><address addr="10.0.0.1"/><ports><port protocol="tcp" portid="22"><state state="open"/></port></ports></host>
      <host><address addr="10.0.0.2"/><ports><port protocol="tcp" portid="http"><state state="open"/></port></ports></host>
    </nmaprun>"#;

    let err = ReportParser::new().parse(report.as_bytes()).unwrap_err();
    assert!(matches!(err, ScanwiseError::MalformedReport(_)));
}

#[test]
fn loose_json_uses_same_defaults_and_drop_rules() {
    let json = br#"{
      "hosts": [
        {"ip": "10.2.0.1", "hostnames": ["db.lan"], "os": {"name": "Debian"},
         "ports": [{"port": "5432", "protocol": "tcp", "service": {"name": "postgresql"},
                    "vulnerabilities": [{"id": "CVE-2023-2454", "output": "schema_element bypass"}, {}]}]},
        {"address": "10.2.0.2", "ports": []},
        {"ports": [{"portid": 80}]}
      ]
    }"#;

    let result = load_scan_json(json).unwrap();

    assert_eq!(result.summary().host_count, 1);
    assert_eq!(result.summary().port_count, 1);

    let host = &result.hosts()[0];
    assert_eq!(host.address, "10.2.0.1");
    assert_eq!(host.os_name, "Debian");

    let vulns = &host.ports[0].vulnerabilities;
    assert_eq!(host.ports[0].port_id, 5432);
    assert_eq!(vulns[0].id, "CVE-2023-2454");
    assert_eq!(vulns[1].id, "unknown-id");
    assert_eq!(vulns[1].output, "No description");
}

#[test]
fn loose_json_rejects_bad_port() {
    let err = load_scan_json(br#"{"hosts": [{"address": "10.0.0.1", "ports": [{"portid": "ssh"}]}]}"#)
        .unwrap_err();
    assert!(matches!(err, ScanwiseError::MalformedReport(_)));
}

#[test]
fn deeply_nested_report_is_malformed() {
    let depth = 60_000;
    let mut report = String::from(r#"<nmaprun><host><address addr="10.0.0.1"/>"#);
    report.push_str(&"<x>".repeat(depth));
    report.push_str(&"</x>".repeat(depth));
    report.push_str("</host></nmaprun>");

    let err = ReportParser::new().parse(report.as_bytes()).unwrap_err();
    assert!(matches!(err, ScanwiseError::MalformedReport(_)));
}
