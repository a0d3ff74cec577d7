pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use log::{error, info, warn};
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

// constants for API interaction
pub const BASE_DELAY_MS: u64 = 1000;
pub const LLM_TIMEOUT_SECS: u64 = 300;

#[derive(Debug)]
pub struct LLMResponse {
    pub content: String,
}

#[derive(Debug)]
pub enum LlmError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
    EmptyResponse,
    Timeout(u64),
    MissingCredentials(&'static str),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Http(e) => write!(f, "LLM request failed: {}", e),
            LlmError::Api { status, body } => write!(f, "LLM API error {}: {}", status, body),
            LlmError::EmptyResponse => write!(f, "LLM returned an empty completion"),
            LlmError::Timeout(secs) => write!(f, "LLM call timed out after {}s", secs),
            LlmError::MissingCredentials(var) => write!(f, "{} is not set", var),
        }
    }
}

impl Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Http(err)
    }
}

/// a text-generation backend
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn text_chat(&self, system_prompt: &str, prompt: &str) -> Result<LLMResponse, LlmError>;
}

/// providers known to the bot, keyed by id
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn TextProvider>>,
    order: Vec<String>,
    active: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// builds every provider whose credentials are present in the environment
    pub fn from_env() -> Self {
        let mut registry = Self::new();

        match GeminiProvider::from_env() {
            Ok(provider) => registry.register(Arc::new(provider)),
            Err(e) => info!("Gemini provider disabled: {}", e),
        }
        match OpenAiProvider::from_env() {
            Ok(provider) => registry.register(Arc::new(provider)),
            Err(e) => info!("OpenAI-compatible provider disabled: {}", e),
        }

        if let Ok(active) = env::var("ACTIVE_PROVIDER") {
            registry.set_active(&active);
        }

        registry
    }

    pub fn register(&mut self, provider: Arc<dyn TextProvider>) {
        let id = provider.id().to_string();
        if self.providers.insert(id.clone(), provider).is_none() {
            self.order.push(id);
        }
    }

    pub fn set_active(&mut self, id: &str) {
        if !id.is_empty() {
            self.active = Some(id.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get_provider_by_id(&self, id: &str) -> Option<Arc<dyn TextProvider>> {
        self.providers.get(id).cloned()
    }

    /// the active provider if it is registered, otherwise the first one registered
    pub fn get_using_provider(&self) -> Option<Arc<dyn TextProvider>> {
        self.active
            .as_deref()
            .and_then(|id| self.get_provider_by_id(id))
            .or_else(|| {
                self.order
                    .first()
                    .and_then(|id| self.get_provider_by_id(id))
            })
    }
}

pub fn calculate_delay(attempt: u32) -> Duration {
    let base_delay = BASE_DELAY_MS * (1 << attempt); // exponential backoff: 1s, 2s, 4s
    let jitter = fastrand::u64(0..=base_delay / 4); // add up to 25% jitter
    Duration::from_millis(base_delay + jitter)
}

/// one provider call with an overall timeout and `max_retries` extra attempts
pub async fn query_with_retries(
    provider: &dyn TextProvider,
    system_prompt: &str,
    prompt: &str,
    max_retries: u32,
) -> Result<LLMResponse, LlmError> {
    info!("Querying LLM provider: {}", provider.id());

    let mut attempt = 0;
    loop {
        let result = match timeout(
            Duration::from_secs(LLM_TIMEOUT_SECS),
            provider.text_chat(system_prompt, prompt),
        )
        .await
        {
            Ok(Ok(response)) if response.content.trim().is_empty() => {
                Err(LlmError::EmptyResponse)
            }
            Ok(result) => result,
            Err(_elapsed) => Err(LlmError::Timeout(LLM_TIMEOUT_SECS)),
        };

        match result {
            Ok(response) => {
                info!(
                    "Received LLM response of length: {} (attempt {})",
                    response.content.len(),
                    attempt + 1
                );
                return Ok(response);
            }
            Err(e) if attempt < max_retries => {
                let delay = calculate_delay(attempt);
                warn!(
                    "LLM call to {} failed (attempt {}/{}): {}. Retrying in {}ms",
                    provider.id(),
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    "LLM call to {} failed after {} attempts: {}",
                    provider.id(),
                    attempt + 1,
                    e
                );
                return Err(e);
            }
        }
    }
}
