use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanwiseError {
    #[error("Malformed scan report: {0}")]
    MalformedReport(String),

    #[error("No API credential configured for {provider}")]
    MissingCredential { provider: String },

    #[error("LLM client error: {0}")]
    LlmClientError(String),

    #[error("LLM advisory request timed out after {timeout} seconds")]
    AnalysisTimeout { timeout: u64 },

    #[error("Invalid command line arguments: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ScanwiseError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ScanwiseError::MalformedReport(message.into())
    }
}

impl From<quick_xml::Error> for ScanwiseError {
    fn from(err: quick_xml::Error) -> Self {
        ScanwiseError::MalformedReport(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ScanwiseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ScanwiseError::MalformedReport(err.to_string())
    }
}
