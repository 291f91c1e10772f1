use async_trait::async_trait;
use snapsolve::{
    Error, Result,
    llm::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, LlmClient},
    ocr::{OcrEngine, Recognition},
};
use std::sync::{Arc, Mutex};

/// Mock OCR engine for testing
#[derive(Debug, Clone)]
pub struct MockOcrEngine {
    pub text: Option<String>,
    pub error: Option<String>,
    pub panic: Option<String>,
    pub calls: Arc<Mutex<Vec<(Vec<u8>, String)>>>,
}

impl MockOcrEngine {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            error: None,
            panic: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            text: None,
            error: Some(error.to_string()),
            panic: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An engine that panics mid-recognition instead of returning an error
    pub fn panicking(message: &str) -> Self {
        Self {
            text: None,
            error: None,
            panic: Some(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, image: &[u8], language: &str) -> Result<Recognition> {
        self.calls
            .lock()
            .unwrap()
            .push((image.to_vec(), language.to_string()));

        if let Some(ref message) = self.panic {
            panic!("{}", message);
        }

        if let Some(ref error) = self.error {
            return Err(Error::ocr(error.clone()));
        }

        Ok(Recognition {
            text: self.text.clone().unwrap_or_default(),
        })
    }
}

/// Mock LLM client for testing
#[derive(Debug, Clone)]
pub struct MockLlmClient {
    pub content: Option<String>,
    pub error: Option<String>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockLlmClient {
    /// Always answers with `content` as the first choice.
    pub fn answering(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers with a choice that carries no content.
    pub fn silent() -> Self {
        Self {
            content: None,
            error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            content: None,
            error: Some(error.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::Io(std::io::Error::other(error.clone())));
        }

        Ok(ChatCompletionResponse {
            model: "deepseek-reasoner".to_string(),
            choices: vec![Choice {
                message: self.content.clone().map(|content| ChatMessage {
                    role: "assistant".to_string(),
                    content,
                }),
            }],
            usage: None,
        })
    }
}
