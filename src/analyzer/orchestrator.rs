use crate::analyzer::llm_client::{create_llm_client, LlmConfig, LlmProvider};
use crate::analyzer::prompts::PromptTemplate;
use crate::error::ScanwiseError;
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

/// Obtains advisory text for scan context already sized by
/// [`PromptTemplate::fit_context`].
///
/// Failures never escape: a missing credential, a transport error or a
/// timeout all come back as an `Error: ...` text payload, which downstream
/// extraction handles like any other unhelpful answer.
pub struct AdvisoryOrchestrator {
    backend: Backend,
    max_concurrent_requests: usize,
    default_timeout: Duration,
}

enum Backend {
    Ready(Arc<dyn LlmProvider + Send + Sync>),
    Unavailable(String),
}

pub fn error_payload(error: &ScanwiseError) -> String {
    format!("Error: {}", error)
}

impl AdvisoryOrchestrator {
    pub fn new(config: LlmConfig, max_concurrent: usize) -> Self {
        let default_timeout = Duration::from_secs(config.timeout_seconds);
        let backend = match create_llm_client(config) {
            Ok(client) => Backend::Ready(client.into()),
            Err(e) => {
                warn!(error = %e, "advisory generation unavailable");
                Backend::Unavailable(error_payload(&e))
            }
        };

        Self {
            backend,
            max_concurrent_requests: max_concurrent.max(1),
            default_timeout,
        }
    }

    pub fn with_provider(provider: Arc<dyn LlmProvider + Send + Sync>, max_concurrent: usize) -> Self {
        let default_timeout = provider.get_timeout();
        Self {
            backend: Backend::Ready(provider),
            max_concurrent_requests: max_concurrent.max(1),
            default_timeout,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    pub async fn request_advisory(&self, context: &str) -> String {
        let client = match &self.backend {
            Backend::Ready(client) => client,
            Backend::Unavailable(payload) => return payload.clone(),
        };

        let prompt = PromptTemplate::build_advisory_prompt(context);

        info!(model = client.get_model_name(), prompt_chars = prompt.len(), "requesting advisory");

        let outcome = timeout(self.default_timeout, client.generate(&prompt))
            .await
            .map_err(|_| ScanwiseError::AnalysisTimeout {
                timeout: self.default_timeout.as_secs(),
            })
            .and_then(|result| result);

        match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "advisory request failed");
                error_payload(&e)
            }
        }
    }

    /// Request advisories for several contexts, at most
    /// `max_concurrent_requests` at a time. Output order matches input order.
    pub async fn request_advisories(&self, contexts: &[String]) -> Vec<String> {
        let mut advisories = Vec::with_capacity(contexts.len());

        for chunk in contexts.chunks(self.max_concurrent_requests) {
            let batch = chunk.iter().map(|context| self.request_advisory(context));
            advisories.extend(join_all(batch).await);
        }

        advisories
    }
}
