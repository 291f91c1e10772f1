use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionResponse {
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the engine returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Choice {
    /// `None` when the engine sent a choice without textual content.
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatMessage {
    /// Only user turns are ever sent; the prompt is a single message.
    pub fn to_openai_message(&self) -> Result<ChatCompletionRequestMessage, crate::Error> {
        if self.role != "user" {
            return Err(crate::Error::reasoning(format!(
                "Unknown message role: {}",
                self.role
            )));
        }

        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                self.content.clone(),
            ))
            .build()
            .map_err(|e| crate::Error::reasoning(format!("Failed to build user message: {}", e)))?;
        Ok(msg.into())
    }
}
