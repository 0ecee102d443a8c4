use crate::models::{AdvisoryRecord, Priority, VulnerabilityRow, WorkflowStatus};
use crate::storage::LedgerSummary;

const DESCRIPTION_PREVIEW_CHARS: usize = 60;

pub struct ReportFormatter {
    use_colors: bool,
    verbose: bool,
}

impl ReportFormatter {
    pub fn new(use_colors: bool, verbose: bool) -> Self {
        Self { use_colors, verbose }
    }

    pub fn for_terminal(verbose: bool) -> Self {
        // Disable color if NO_COLOR environment variable is set
        Self::new(std::env::var("NO_COLOR").is_err(), verbose)
    }

    pub fn format_rows(&self, source: &str, rows: &[VulnerabilityRow]) -> String {
        let mut output = self.format_section(&format!("Findings for {}", source));
        output.push('\n');

        if rows.is_empty() {
            output.push_str("No vulnerabilities reported.\n");
            return output;
        }

        for row in rows {
            output.push_str(&format!(
                "{} {}:{} ({}) {}\n",
                self.format_priority(row.priority),
                row.host,
                row.port_id,
                row.service,
                row.vuln_id
            ));
            output.push_str(&format!("    Patch: {}\n", single_line(&row.patch)));

            if self.verbose {
                output.push_str(&format!(
                    "    Host: {} [{}]\n    Details: {}\n",
                    row.hostnames,
                    row.os_name,
                    preview(&row.description, DESCRIPTION_PREVIEW_CHARS)
                ));
            }
        }

        output
    }

    pub fn format_extraction(&self, record: &AdvisoryRecord) -> String {
        format!(
            "{} {}\n    Patch: {}\n",
            self.format_priority(record.priority),
            record.vuln_id,
            single_line(&record.patch)
        )
    }

    pub fn format_summary(&self, summary: &LedgerSummary) -> String {
        let mut output = self.format_section("Ledger summary");
        output.push_str(&format!("\nTotal rows: {}\n\nBy priority:\n", summary.total_rows));

        for priority in Priority::ALL {
            let count = summary.by_priority.get(&priority).copied().unwrap_or(0);
            output.push_str(&format!("  {:<12} {}\n", priority.as_str(), count));
        }

        output.push_str("\nBy status:\n");
        for status in WorkflowStatus::ALL {
            let count = summary.by_status.get(&status).copied().unwrap_or(0);
            output.push_str(&format!("  {:<12} {}\n", status.as_str(), count));
        }

        if summary.skipped_rows > 0 {
            output.push_str(&format!("\nSkipped unreadable rows: {}\n", summary.skipped_rows));
        }

        output
    }

    fn format_priority(&self, priority: Priority) -> String {
        let label = format!("[{:<8}]", priority.as_str());
        if !self.use_colors {
            return label;
        }

        let color_code = match priority {
            Priority::Critical => "\x1b[1m\x1b[31m", // Bold red
            Priority::High => "\x1b[1m\x1b[33m",     // Bold yellow
            Priority::Medium => "\x1b[1m\x1b[35m",   // Bold magenta
            Priority::Low => "\x1b[1m\x1b[32m",      // Bold green
            Priority::Unknown => "\x1b[1m\x1b[34m",  // Bold blue
        };
        format!("{}{}\x1b[0m", color_code, label)
    }

    fn format_section(&self, title: &str) -> String {
        if self.use_colors {
            format!("\x1b[1m\x1b[37m{}\x1b[0m", title)
        } else {
            format!("{}\n{}", title, "─".repeat(title.chars().count()))
        }
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = single_line(text);
    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    }
}
