use chrono::{Local, TimeZone};
use scanwise::analyzer::RecordAggregator;
use scanwise::models::{Host, Port, Priority, ScanResult, Service, Vulnerability, WorkflowStatus};
use scanwise::storage::{AdvisoryLog, CsvLedger, LEDGER_FILE_NAME};

const HEADER: &str = "Timestamp,Host,Hostname,OS,ID,Port,Service,Vulnerability,Patch/Mitigation,Priority,Status";

fn scan() -> ScanResult {
    ScanResult::from_hosts(vec![Host::new("172.16.0.4")
        .with_hostname("files.corp")
        .with_hostname("nas")
        .with_port(
            Port::new(445, "tcp")
                .with_service(Service::named("microsoft-ds"))
                .with_vulnerability(Vulnerability::new(
                    "smb-vuln-ms17-010",
                    "VULNERABLE:\n  Remote Code Execution, \"EternalBlue\"",
                ))
                .with_vulnerability(Vulnerability::new("smb2-security-mode", "-signing not required")),
        )])
}

const ADVISORY: &str = "{smb-vuln-ms17-010, Critical}\n\
    Patches: [smb-vuln-ms17-010, apply MS17-010, disable SMBv1]\n";

#[test]
fn header_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = CsvLedger::in_dir(dir.path());
    let rows = RecordAggregator::aggregate(&scan(), ADVISORY);

    assert_eq!(ledger.append(&rows).unwrap(), 2);
    assert_eq!(ledger.append(&rows).unwrap(), 2);

    let content = std::fs::read_to_string(dir.path().join(LEDGER_FILE_NAME)).unwrap();
    assert_eq!(content.matches(HEADER).count(), 1);
    assert!(content.starts_with(HEADER));

    let summary = ledger.summarize().unwrap();
    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.skipped_rows, 0);
}

#[test]
fn fields_with_separators_survive_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = CsvLedger::in_dir(&dir.path().join("nested").join("logs"));
    let rows = RecordAggregator::aggregate(&scan(), ADVISORY);

    ledger.append(&rows).unwrap();
    let content = std::fs::read_to_string(ledger.path()).unwrap();

    assert!(content.contains("\"VULNERABLE:\n  Remote Code Execution, \"\"EternalBlue\"\"\""));
    assert!(content.contains("\"apply MS17-010, disable SMBv1\""));
    assert!(content.contains("\"'-signing not required\""));

    let summary = ledger.summarize().unwrap();
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.by_priority.get(&Priority::Critical), Some(&1));
    assert_eq!(summary.by_priority.get(&Priority::Unknown), Some(&1));
    assert_eq!(summary.by_status.get(&WorkflowStatus::Pending), Some(&2));
}

#[test]
fn bulleted_patches_are_stored_as_written() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = CsvLedger::in_dir(dir.path());
    let advisory = "{smb-vuln-ms17-010, High}\n\
        Patches: [smb-vuln-ms17-010, - apply MS17-010\n- disable SMBv1]\n\
        Patches: [smb2-security-mode, + require signing]\n";
    let rows = RecordAggregator::aggregate(&scan(), advisory);

    ledger.append(&rows).unwrap();
    let content = std::fs::read_to_string(ledger.path()).unwrap();

    assert!(content.contains(",\"- apply MS17-010\n- disable SMBv1\",High,"));
    assert!(content.contains(",+ require signing,"));
    assert!(!content.contains("'- apply"));
    assert!(!content.contains("'+ require"));

    let summary = ledger.summarize().unwrap();
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.skipped_rows, 0);
}

#[test]
fn summary_counts_edited_statuses_and_skips_broken_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(LEDGER_FILE_NAME);
    std::fs::write(
        &path,
        format!(
            "{HEADER}\r\n\
             2025-01-02 10:00:00,10.0.0.1,No hostname,Unknown OS,a,22,ssh,x,y,High,Patched\r\n\
             2025-01-02 10:00:00,10.0.0.1,No hostname,Unknown OS,b,22,ssh,x,y,Low,In Progress\r\n\
             2025-01-02 10:00:00,10.0.0.1,No hostname,Unknown OS,c,22,ssh,x,y,Medium,Ignored\r\n\
             truncated,row\r\n"
        ),
    )
    .unwrap();

    let summary = CsvLedger::new(&path).summarize().unwrap();

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.skipped_rows, 2);
    assert_eq!(summary.by_status.get(&WorkflowStatus::Patched), Some(&1));
    assert_eq!(summary.by_status.get(&WorkflowStatus::InProgress), Some(&1));
    assert_eq!(summary.by_priority.get(&Priority::High), Some(&1));
    assert_eq!(summary.by_priority.get(&Priority::Medium), None);
}

#[test]
fn advisory_log_appends_blocks_to_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = AdvisoryLog::new(dir.path().join("logs"));

    let morning = Local.with_ymd_and_hms(2025, 4, 20, 9, 0, 0).unwrap();
    let evening = Local.with_ymd_and_hms(2025, 4, 20, 21, 15, 30).unwrap();
    let next_day = Local.with_ymd_and_hms(2025, 4, 21, 7, 45, 0).unwrap();

    let first = log.append("first advisory", morning).unwrap();
    let second = log.append("second advisory", evening).unwrap();
    let third = log.append("third advisory", next_day).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, third);
    assert!(first.ends_with("vulnerability_log_2025-04-20.txt"));

    let content = std::fs::read_to_string(&first).unwrap();
    let rule = "=".repeat(80);
    assert_eq!(content.matches(&rule).count(), 4);
    assert!(content.contains("Timestamp: 2025-04-20 09:00:00\n\nNmap Scan Results:\nfirst advisory\n"));
    assert!(content.contains("Timestamp: 2025-04-20 21:15:30"));
    assert!(content.find("first advisory") < content.find("second advisory"));
    assert!(!content.contains("third advisory"));
}
