use super::config::AiConfig;
use crate::error::AiError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const AI_TIMEOUT: Duration = Duration::from_secs(60);

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>>;

/// Per-call overrides of the configured sampling settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A black-box text completion service.
pub trait CompletionService: Send + Sync {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
        options: CompletionOptions,
    ) -> CompletionFuture<'a>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    config: AiConfig,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(AI_TIMEOUT)
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    async fn chat_completion(
        &self,
        system: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, AiError> {
        let endpoint = self.config.completions_url();
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: options.temperature.unwrap_or(self.config.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
        };

        tracing::debug!(
            "AI request: endpoint={}, model={}, prompt_chars={}",
            endpoint,
            self.config.model,
            prompt.len()
        );

        let mut builder = self.client.post(&endpoint).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("AI endpoint returned {}: {}", status, body);
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

impl CompletionService for OpenAiClient {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
        options: CompletionOptions,
    ) -> CompletionFuture<'a> {
        Box::pin(self.chat_completion(system, prompt, options))
    }
}
