use super::mocks::{MockLlmClient, MockOcrEngine};
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use serde_json::Value;
use snapsolve::{
    config::Config,
    pipeline::Pipeline,
    server::{self, handlers::AppState},
};
use std::sync::Arc;

pub const BOUNDARY: &str = "snapsolve-test-boundary";

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.reasoning.api_key = "test-api-key".to_string();
    config
}

/// Build the full router around the given mocks
pub fn create_test_app(config: &Config, ocr: &MockOcrEngine, llm: &MockLlmClient) -> Router {
    let pipeline = Pipeline::new(
        Arc::new(ocr.clone()),
        Arc::new(llm.clone()),
        &config.reasoning,
    );
    server::router(AppState::new(Arc::new(pipeline), config))
}

/// One part of a hand-built multipart body
pub struct FormPart {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl FormPart {
    pub fn file(name: &'static str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            file_name: Some("problem.png"),
            content_type: Some("image/png"),
            data: data.into(),
        }
    }

    pub fn text(name: &'static str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[FormPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[FormPart]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
