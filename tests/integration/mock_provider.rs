use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use qq_portrait::llm::{LLMResponse, LlmError, TextProvider};

/// the prompts a provider was called with
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub system_prompt: String,
    pub prompt: String,
}

/// mock provider answering from a script; an exhausted script answers with an api error
pub struct MockProvider {
    id: String,
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockProvider {
    pub fn new(id: &str, responses: Vec<Result<String, String>>) -> Self {
        Self {
            id: id.to_string(),
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(id: &str, content: &str) -> Self {
        Self::new(id, vec![Ok(content.to_string())])
    }

    pub fn failing(id: &str) -> Self {
        Self::new(id, vec![Err("provider exploded".to_string())])
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn text_chat(&self, system_prompt: &str, prompt: &str) -> Result<LLMResponse, LlmError> {
        self.calls.lock().unwrap().push(ProviderCall {
            system_prompt: system_prompt.to_string(),
            prompt: prompt.to_string(),
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(LLMResponse { content }),
            Some(Err(body)) => Err(LlmError::Api { status: 500, body }),
            None => Err(LlmError::Api {
                status: 500,
                body: "no scripted response".to_string(),
            }),
        }
    }
}
