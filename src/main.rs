use scanwise::{
    cli::{Cli, CliHandler},
    error::ScanwiseError,
};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("❌ Argument parsing failed: {}", e);
            process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let handler = CliHandler::new(cli);

    let exit_code = match handler.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            match e {
                ScanwiseError::InvalidArguments(_) => 2,
                ScanwiseError::MalformedReport(_) => 3,
                ScanwiseError::Storage(_) | ScanwiseError::IoError(_) => 4,
                _ => 1,
            }
        }
    };

    process::exit(exit_code);
}
