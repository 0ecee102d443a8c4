// Analyzer module - context assembly, advisory generation and field extraction

pub mod aggregator;
pub mod context;
pub mod extractor;
pub mod llm_client;
pub mod orchestrator;
pub mod prompts;

pub use aggregator::RecordAggregator;
pub use context::ContextFlattener;
pub use extractor::AdvisoryExtractor;
pub use llm_client::{create_llm_client, LlmConfig, LlmProvider, ProviderKind};
pub use orchestrator::AdvisoryOrchestrator;
pub use prompts::PromptTemplate;
