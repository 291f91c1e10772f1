use super::types::*;
use crate::{Result, config::ReasoningConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// An OpenAI-compatible chat completion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    pub fn new(config: &ReasoningConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.clone());
        }

        // async-openai retries rate limits and 5xx on its own; one attempt only.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config).with_backoff(no_retry);

        Self { client }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(
            "Creating chat completion with {} messages for model {}",
            request.messages.len(),
            request.model
        );

        let mut messages = Vec::new();
        for msg in &request.messages {
            messages.push(msg.to_openai_message()?);
        }

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder.model(&request.model).messages(messages);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }

        let openai_request = request_builder.build()?;

        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choices: Vec<Choice> = response
            .choices
            .into_iter()
            .map(|choice| {
                let role = format!("{:?}", choice.message.role).to_lowercase();
                Choice {
                    message: choice
                        .message
                        .content
                        .map(|content| ChatMessage { role, content }),
                }
            })
            .collect();

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletionResponse {
            model: response.model,
            choices,
            usage,
        })
    }
}
