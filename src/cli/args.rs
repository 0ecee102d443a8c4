use crate::analyzer::llm_client::{LlmConfig, ProviderKind, DEFAULT_MODEL};
use crate::error::ScanwiseError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "Vulnerability_Logs";
pub const DEFAULT_TIMEOUT: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "scanwise")]
#[command(about = "Turn network scan reports into prioritized, patch-annotated vulnerability ledgers")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Enable debug output including parser decisions
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a scan report and print the normalized result as JSON
    Parse {
        /// Scan report (tree markup)
        report: PathBuf,

        /// Turn per-port script output into vulnerabilities
        #[arg(long)]
        scripts: bool,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Print the flattened advisory context for a scan
    Context {
        /// Scan report or loose JSON scan
        input: PathBuf,
    },

    /// Extract priority and patch for vulnerability ids from advisory text
    Extract {
        /// File holding advisory text
        #[arg(short = 'a', long)]
        advisory: PathBuf,

        /// Vulnerability id to look up (repeatable)
        #[arg(short = 'i', long = "id", required = true)]
        ids: Vec<String>,
    },

    /// Request advisories for scans and append the results to the ledger
    Analyze {
        /// Scan reports or loose JSON scans
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// LLM model used for advisories
        #[arg(short = 'm', long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Maximum time for one advisory request in seconds (10-300)
        #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT, value_parser = validate_timeout)]
        timeout: u64,

        /// API key for the model provider (defaults to the provider's env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Directory for the ledger and advisory logs
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Ignore per-port script output in markup reports
        #[arg(long)]
        no_scripts: bool,

        /// Print rows without writing the ledger or logs
        #[arg(long)]
        dry_run: bool,

        /// Maximum advisory requests in flight
        #[arg(long, default_value_t = 2)]
        max_concurrent: usize,
    },

    /// Tally ledger rows by priority and status
    Summary {
        /// Directory holding the ledger
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Print the tallies as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Result<Self, ScanwiseError> {
        let cli = Self::try_parse().map_err(|e| ScanwiseError::InvalidArguments(e.to_string()))?;

        cli.validate()?;

        Ok(cli)
    }

    pub fn validate(&self) -> Result<(), ScanwiseError> {
        if let Command::Analyze {
            model,
            max_concurrent,
            ..
        } = &self.command
        {
            if *max_concurrent == 0 {
                return Err(ScanwiseError::InvalidArguments(
                    "--max-concurrent must be at least 1".to_string(),
                ));
            }

            let model = self.resolve_model(model);
            if ProviderKind::detect(&model).is_none() {
                return Err(ScanwiseError::InvalidArguments(format!(
                    "Unsupported model '{}'",
                    model
                )));
            }
        }

        Ok(())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose || self.debug
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Level filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "scanwise=debug"
        } else if self.verbose {
            "scanwise=info"
        } else {
            "scanwise=warn"
        }
    }

    pub fn resolve_model(&self, cli_model: &str) -> String {
        // The environment only overrides the built-in default
        if cli_model == DEFAULT_MODEL {
            if let Ok(model) = std::env::var("SCANWISE_MODEL") {
                if !model.trim().is_empty() {
                    return model.trim().to_string();
                }
            }
        }
        cli_model.to_string()
    }

    pub fn resolve_timeout(&self, cli_timeout: u64) -> u64 {
        if cli_timeout == DEFAULT_TIMEOUT {
            if let Ok(timeout_str) = std::env::var("SCANWISE_TIMEOUT") {
                if let Ok(timeout) = timeout_str.parse::<u64>() {
                    if (10..=300).contains(&timeout) {
                        return timeout;
                    }
                }
            }
        }
        cli_timeout
    }

    pub fn resolve_output_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        if let Some(dir) = cli_dir {
            return dir.clone();
        }
        std::env::var("SCANWISE_OUTPUT_DIR")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Build the explicit client configuration for `analyze`, pulling the
    /// credential from the provider's environment variable when no key was
    /// given on the command line.
    pub fn llm_config(&self) -> Option<LlmConfig> {
        let Command::Analyze {
            model,
            timeout,
            api_key,
            ..
        } = &self.command
        else {
            return None;
        };

        let model = self.resolve_model(model);
        let api_key = api_key.clone().or_else(|| {
            ProviderKind::detect(&model).and_then(|kind| std::env::var(kind.credential_env_var()).ok())
        });

        Some(
            LlmConfig::new(model)
                .with_api_key(api_key)
                .with_timeout(self.resolve_timeout(*timeout)),
        )
    }
}

fn validate_timeout(s: &str) -> Result<u64, String> {
    let timeout: u64 = s.parse().map_err(|_| "Timeout must be a number")?;

    if (10..=300).contains(&timeout) {
        Ok(timeout)
    } else {
        Err("Timeout must be between 10 and 300 seconds".to_string())
    }
}
