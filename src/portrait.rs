use log::{error, info};
use std::sync::Arc;

use crate::config::PortraitConfig;
use crate::llm::{query_with_retries, ProviderRegistry, TextProvider};
use crate::onebot::types::Gender;
use crate::prompts::{build_system_prompt, build_user_prompt};

/// turns a user's texts into a portrait with one LLM call
pub struct PortraitGenerator<'a> {
    providers: &'a ProviderRegistry,
    config: &'a PortraitConfig,
}

impl<'a> PortraitGenerator<'a> {
    pub fn new(providers: &'a ProviderRegistry, config: &'a PortraitConfig) -> Self {
        Self { providers, config }
    }

    /// configured provider id first, then the active provider
    pub fn resolve_provider(&self) -> Option<Arc<dyn TextProvider>> {
        let configured = if self.config.provider_id.is_empty() {
            None
        } else {
            self.providers.get_provider_by_id(&self.config.provider_id)
        };
        configured.or_else(|| self.providers.get_using_provider())
    }

    /// None when no provider is available or the call fails; both are logged
    pub async fn generate(&self, nickname: &str, gender: Gender, texts: &[String]) -> Option<String> {
        let Some(provider) = self.resolve_provider() else {
            error!("No LLM provider is configured for text generation");
            return None;
        };
        info!(
            "Generating portrait of {} from {} texts with provider {}",
            nickname,
            texts.len(),
            provider.id()
        );

        let system_prompt = match build_system_prompt(
            &self.config.system_prompt_template,
            nickname,
            gender,
            self.config.language,
        ) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("LLM call failed: {}", e);
                return None;
            }
        };
        let prompt = build_user_prompt(nickname, texts);

        match query_with_retries(
            provider.as_ref(),
            &system_prompt,
            &prompt,
            self.config.llm_max_retries,
        )
        .await
        {
            Ok(response) => Some(response.content),
            Err(e) => {
                error!("LLM call failed: {}", e);
                None
            }
        }
    }
}
