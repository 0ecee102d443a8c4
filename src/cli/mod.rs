pub mod args;
pub mod reporter;

pub use args::{Cli, Command};
pub use reporter::ReportFormatter;

use crate::analyzer::llm_client::DEFAULT_MODEL;
use crate::analyzer::prompts::MAX_CONTEXT_TOKENS;
use crate::analyzer::{
    AdvisoryExtractor, AdvisoryOrchestrator, ContextFlattener, LlmConfig, PromptTemplate,
    RecordAggregator,
};
use crate::error::ScanwiseError;
use crate::models::{ScanResult, VulnerabilityRow};
use crate::parser::{load_scan, ReportParser};
use crate::storage::{AdvisoryLog, CsvLedger};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub struct CliHandler {
    cli: Cli,
    orchestrator: Option<AdvisoryOrchestrator>,
}

/// What `analyze` produced for one input.
#[derive(Debug)]
pub struct InputOutcome {
    pub input: PathBuf,
    pub rows: Vec<VulnerabilityRow>,
    pub advisory: Option<String>,
}

impl CliHandler {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            orchestrator: None,
        }
    }

    /// Use a prepared orchestrator for `analyze` instead of building one
    /// from the command line configuration.
    pub fn with_orchestrator(mut self, orchestrator: AdvisoryOrchestrator) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    pub async fn run(&self) -> Result<i32, ScanwiseError> {
        match &self.cli.command {
            Command::Parse {
                report,
                scripts,
                compact,
            } => self.run_parse(report, *scripts, *compact),
            Command::Context { input } => self.run_context(input),
            Command::Extract { advisory, ids } => self.run_extract(advisory, ids),
            Command::Analyze {
                inputs,
                output_dir,
                no_scripts,
                dry_run,
                max_concurrent,
                ..
            } => {
                let out_dir = self.cli.resolve_output_dir(output_dir.as_ref());
                let (outcomes, failures) = self
                    .analyze_inputs(inputs, !*no_scripts, *max_concurrent)
                    .await;

                if !*dry_run {
                    self.persist(&outcomes, &out_dir)?;
                }

                let formatter = ReportFormatter::for_terminal(self.cli.is_verbose());
                for outcome in &outcomes {
                    print!("{}", formatter.format_rows(&outcome.input.display().to_string(), &outcome.rows));
                }

                // Inputs that failed to load were reported as they happened
                Ok(if failures > 0 { 3 } else { 0 })
            }
            Command::Summary { output_dir, json } => {
                let out_dir = self.cli.resolve_output_dir(output_dir.as_ref());
                self.run_summary(&out_dir, *json)
            }
        }
    }

    fn run_parse(&self, report: &Path, scripts: bool, compact: bool) -> Result<i32, ScanwiseError> {
        let parser = if scripts {
            ReportParser::new().with_script_findings()
        } else {
            ReportParser::new()
        };
        let result = parser.parse_file(report)?;

        let json = if compact {
            serde_json::to_string(&result)?
        } else {
            serde_json::to_string_pretty(&result)?
        };
        println!("{}", json);
        Ok(0)
    }

    fn run_context(&self, input: &Path) -> Result<i32, ScanwiseError> {
        let result = load_scan(input, &ReportParser::new().with_script_findings())?;
        let context = ContextFlattener::flatten(&result);

        if context.is_empty() {
            info!(input = %input.display(), "scan has no vulnerability blocks");
        } else {
            println!("{}", context);
        }
        Ok(0)
    }

    fn run_extract(&self, advisory: &Path, ids: &[String]) -> Result<i32, ScanwiseError> {
        let text = std::fs::read_to_string(advisory)?;
        let formatter = ReportFormatter::for_terminal(self.cli.is_verbose());

        for id in ids {
            let record = AdvisoryExtractor::extract(&text, id);
            print!("{}", formatter.format_extraction(&record));
        }
        Ok(0)
    }

    fn run_summary(&self, out_dir: &Path, json: bool) -> Result<i32, ScanwiseError> {
        let summary = CsvLedger::in_dir(out_dir).summarize()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            let formatter = ReportFormatter::for_terminal(self.cli.is_verbose());
            print!("{}", formatter.format_summary(&summary));
        }
        Ok(0)
    }

    /// Load every input, request advisories for the ones that have
    /// findings, and aggregate rows. Returns the outcomes in input order and
    /// the number of inputs that could not be loaded.
    pub async fn analyze_inputs(
        &self,
        inputs: &[PathBuf],
        script_findings: bool,
        max_concurrent: usize,
    ) -> (Vec<InputOutcome>, usize) {
        let parser = if script_findings {
            ReportParser::new().with_script_findings()
        } else {
            ReportParser::new()
        };

        let mut loaded: Vec<(PathBuf, ScanResult, String)> = Vec::new();
        let mut failures = 0;

        for input in inputs {
            match load_scan(input, &parser) {
                Ok(result) => {
                    let context = PromptTemplate::fit_context(
                        &ContextFlattener::blocks(&result),
                        MAX_CONTEXT_TOKENS,
                    );
                    debug!(
                        input = %input.display(),
                        hosts = result.summary().host_count,
                        ports = result.summary().port_count,
                        "loaded scan"
                    );
                    loaded.push((input.clone(), result, context));
                }
                Err(e) => {
                    error!(input = %input.display(), error = %e, "skipping input");
                    eprintln!("❌ {}: {}", input.display(), e);
                    failures += 1;
                }
            }
        }

        let contexts: Vec<String> = loaded
            .iter()
            .filter(|(_, _, context)| !context.is_empty())
            .map(|(_, _, context)| context.clone())
            .collect();

        let advisories = if contexts.is_empty() {
            Vec::new()
        } else {
            match &self.orchestrator {
                Some(orchestrator) => orchestrator.request_advisories(&contexts).await,
                None => self.build_orchestrator(max_concurrent).request_advisories(&contexts).await,
            }
        };
        let mut advisories = advisories.into_iter();

        let outcomes = loaded
            .into_iter()
            .map(|(input, result, context)| {
                if context.is_empty() {
                    info!(input = %input.display(), "no findings, skipping advisory request");
                    return InputOutcome {
                        input,
                        rows: Vec::new(),
                        advisory: None,
                    };
                }

                let advisory = advisories.next().unwrap_or_default();
                let rows = RecordAggregator::aggregate(&result, &advisory);
                InputOutcome {
                    input,
                    rows,
                    advisory: Some(advisory),
                }
            })
            .collect();

        (outcomes, failures)
    }

    fn build_orchestrator(&self, max_concurrent: usize) -> AdvisoryOrchestrator {
        let config = self
            .cli
            .llm_config()
            .unwrap_or_else(|| LlmConfig::new(DEFAULT_MODEL));

        info!(model = %config.model_name, timeout = config.timeout_seconds, "using text generator");
        AdvisoryOrchestrator::new(config, max_concurrent)
    }

    fn persist(&self, outcomes: &[InputOutcome], out_dir: &Path) -> Result<(), ScanwiseError> {
        let ledger = CsvLedger::in_dir(out_dir);
        let log = AdvisoryLog::new(out_dir);

        for outcome in outcomes {
            let Some(advisory) = &outcome.advisory else {
                continue;
            };

            ledger
                .append(&outcome.rows)
                .map_err(|e| ScanwiseError::Storage(format!("{}: {}", ledger.path().display(), e)))?;
            log.append(advisory, Local::now())
                .map_err(|e| ScanwiseError::Storage(format!("{}: {}", log.dir().display(), e)))?;
        }
        Ok(())
    }
}
