use scanwise::analyzer::{ContextFlattener, PromptTemplate};
use scanwise::models::{Host, Port, ScanResult, Service, Vulnerability};

fn two_port_host() -> Host {
    Host::new("10.0.0.7")
        .with_hostname("web.lan")
        .with_os("Ubuntu 22.04")
        .with_port(
            Port::new(80, "tcp")
                .with_service(Service::named("http"))
                .with_vulnerability(Vulnerability::new("http-vuln-cve2017-5638", "Apache Struts RCE")),
        )
        .with_port(Port::new(443, "tcp").with_service(Service::named("https")))
}

#[test]
fn port_without_vulnerabilities_contributes_no_block() {
    let result = ScanResult::from_hosts(vec![two_port_host()]);
    let context = ContextFlattener::flatten(&result);

    assert_eq!(context.matches("Vulnerability ID:").count(), 1);
    assert_eq!(
        context,
        "Host: 10.0.0.7 (web.lan)\nOS: Ubuntu 22.04\nPort 80 (http)\nVulnerability ID: http-vuln-cve2017-5638\nDetails: Apache Struts RCE"
    );
}

#[test]
fn blocks_follow_nested_order() {
    let second = Host::new("10.0.0.8").with_port(
        Port::new(22, "tcp")
            .with_service(Service::named("ssh"))
            .with_vulnerability(Vulnerability::new("ssh-weak-kex", "diffie-hellman-group1-sha1"))
            .with_vulnerability(Vulnerability::new("ssh-cbc", "aes128-cbc enabled")),
    );
    let result = ScanResult::from_hosts(vec![two_port_host(), second]);

    let context = ContextFlattener::flatten(&result);
    let blocks: Vec<&str> = context.split("\n\n").collect();

    assert_eq!(blocks.len(), 3);
    assert!(blocks[0].contains("http-vuln-cve2017-5638"));
    assert!(blocks[1].starts_with("Host: 10.0.0.8 (No hostname)"));
    assert!(blocks[1].contains("ssh-weak-kex"));
    assert!(blocks[2].contains("ssh-cbc"));
    assert!(blocks[2].contains("OS: Unknown OS"));
}

#[test]
fn scan_without_findings_flattens_to_nothing() {
    let host = Host::new("10.0.0.9").with_port(Port::new(53, "udp"));
    let result = ScanResult::from_hosts(vec![host]);
    assert_eq!(ContextFlattener::flatten(&result), "");
}

#[test]
fn prompt_embeds_context_and_question() {
    let result = ScanResult::from_hosts(vec![two_port_host()]);
    let context = ContextFlattener::flatten(&result);
    let prompt = PromptTemplate::build_advisory_prompt(&context);

    assert!(prompt.starts_with("Here are the scan results from an Nmap scan:\n\n"));
    assert!(prompt.contains(&context));
    assert!(prompt.contains("\n\nQuestion: "));
    assert!(prompt.ends_with("Answer based on the above data.\n"));
}

#[test]
fn fitted_context_counts_findings_not_paragraphs() {
    let multi_paragraph = "VULNERABLE:\n\nState: VULNERABLE\n\nRisk factor: High\n\nReferences: CVE-2014-0160";
    let host = Host::new("10.0.0.3").with_port(
        Port::new(443, "tcp")
            .with_service(Service::named("https"))
            .with_vulnerability(Vulnerability::new("ssl-heartbleed", multi_paragraph))
            .with_vulnerability(Vulnerability::new("ssl-poodle", &"SSLv3 ".repeat(40))),
    );
    let result = ScanResult::from_hosts(vec![host]);
    let blocks = ContextFlattener::blocks(&result);

    let budget = (blocks[0].len() + 2) / 4 + 1;
    let fitted = PromptTemplate::fit_context(&blocks, budget);

    assert!(fitted.starts_with(&blocks[0]));
    assert!(fitted.contains("References: CVE-2014-0160"));
    assert!(!fitted.contains("ssl-poodle"));
    assert!(fitted.ends_with("[... 1 further findings omitted to fit the model context ...]"));
}
