use crate::analyzer::prompts::PromptTemplate;
use crate::error::ScanwiseError;
use rig::client::CompletionClient;
use rig::completion::{AssistantContent, CompletionModel};
use rig::providers::{anthropic, gemini, openai};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Everything the text-generation client needs, resolved up front by the
/// caller. The client itself never looks at the environment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model_name: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAI,
    Anthropic,
}

pub trait LlmProvider: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScanwiseError>> + Send + 'a>>;
    fn get_model_name(&self) -> &str;
    fn get_timeout(&self) -> Duration;
}

impl LlmConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: None,
            timeout_seconds: 60,
            max_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn provider_kind(&self) -> Option<ProviderKind> {
        ProviderKind::detect(&self.model_name)
    }
}

impl ProviderKind {
    pub fn detect(model: &str) -> Option<Self> {
        let model = model.trim();
        if is_gemini_model(model) {
            Some(ProviderKind::Gemini)
        } else if is_openai_model(model) {
            Some(ProviderKind::OpenAI)
        } else if is_claude_model(model) {
            Some(ProviderKind::Anthropic)
        } else {
            None
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

pub struct RigLlmClient {
    config: LlmConfig,
    provider: RigProvider,
}

enum RigProvider {
    OpenAI(openai::Client),
    Anthropic(anthropic::Client),
    Gemini(gemini::Client),
}

impl RigLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, ScanwiseError> {
        let provider = create_provider(&config)?;
        Ok(Self { config, provider })
    }

    async fn make_api_request(&self, prompt: &str) -> Result<String, ScanwiseError> {
        let system_prompt = PromptTemplate::build_system_prompt();
        let model_name = strip_provider_prefix(&self.config.model_name);

        match &self.provider {
            RigProvider::OpenAI(client) => {
                let model = client.completion_model(model_name);
                self.send_completion_request(model, prompt, system_prompt).await
            }
            RigProvider::Anthropic(client) => {
                let model = client.completion_model(model_name);
                self.send_completion_request(model, prompt, system_prompt).await
            }
            RigProvider::Gemini(client) => {
                let model = client.completion_model(model_name);
                self.send_completion_request(model, prompt, system_prompt).await
            }
        }
    }

    async fn send_completion_request<M: CompletionModel>(
        &self,
        model: M,
        prompt: &str,
        system_prompt: String,
    ) -> Result<String, ScanwiseError> {
        let mut builder = model.completion_request(prompt).preamble(system_prompt);

        // Reasoning models reject a temperature setting
        if let Some(temp) = self.config.temperature {
            if !self.config.model_name.starts_with("gpt-5") && !self.config.model_name.starts_with("o1") {
                builder = builder.temperature(temp as f64);
            }
        }

        if let Some(max_tokens) = self.config.max_tokens {
            builder = builder.max_tokens(max_tokens as u64);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ScanwiseError::LlmClientError(format!("Request failed: {}", e)))?;

        let mut extracted_text = String::new();
        for content in response.choice.iter() {
            if let AssistantContent::Text(text_content) = content {
                extracted_text.push_str(&text_content.text);
            }
        }

        Ok(extracted_text)
    }
}

impl LlmProvider for RigLlmClient {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScanwiseError>> + Send + 'a>> {
        Box::pin(async move {
            let start_time = std::time::Instant::now();
            let text = self.make_api_request(prompt).await?;

            debug!(
                model = %self.config.model_name,
                duration_ms = start_time.elapsed().as_millis() as u64,
                chars = text.len(),
                "received advisory text"
            );

            Ok(text)
        })
    }

    fn get_model_name(&self) -> &str {
        &self.config.model_name
    }

    fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }
}

fn create_provider(config: &LlmConfig) -> Result<RigProvider, ScanwiseError> {
    let kind = config.provider_kind().ok_or_else(|| {
        ScanwiseError::LlmClientError(format!(
            "Unsupported model '{}'. Use Gemini (gemini-*), OpenAI (gpt-*) or Anthropic (claude-*) models",
            config.model_name.trim()
        ))
    })?;

    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| ScanwiseError::MissingCredential {
            provider: kind.display_name().to_string(),
        })?;

    Ok(match kind {
        ProviderKind::Gemini => RigProvider::Gemini(gemini::Client::new(api_key)),
        ProviderKind::OpenAI => RigProvider::OpenAI(openai::Client::new(api_key)),
        ProviderKind::Anthropic => RigProvider::Anthropic(anthropic::Client::new(api_key)),
    })
}

pub fn create_llm_client(
    config: LlmConfig,
) -> Result<Box<dyn LlmProvider + Send + Sync>, ScanwiseError> {
    let client = RigLlmClient::new(config)?;
    Ok(Box::new(client))
}

fn strip_provider_prefix(model: &str) -> &str {
    let model = model.trim();
    ["gemini/", "openai/", "anthropic/"]
        .iter()
        .find_map(|prefix| model.strip_prefix(prefix))
        .unwrap_or(model)
}

fn is_openai_model(model: &str) -> bool {
    let candidate = model.strip_prefix("openai/").unwrap_or(model);
    let candidate = candidate.strip_prefix("ft:").unwrap_or(candidate);

    candidate.starts_with("gpt-")
        || candidate.starts_with("chatgpt-")
        || candidate.starts_with("o1")
        || candidate.starts_with("o3")
        || candidate.starts_with("o4")
}

fn is_claude_model(model: &str) -> bool {
    let candidate = model.strip_prefix("anthropic/").unwrap_or(model);
    candidate.starts_with("claude-")
}

fn is_gemini_model(model: &str) -> bool {
    let candidate = model.strip_prefix("gemini/").unwrap_or(model);
    candidate.starts_with("gemini-")
}
