use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::config::BackendConfig;
use crate::models::error::BackendError;
use crate::models::types::{GenerationMode, GenerationResult};
use crate::traits::generator::Generator;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for an Ollama-compatible `/api/chat` endpoint.
///
/// One attempt per prompt, bounded by `timeout`. Failures are classified into
/// [`BackendError`] and returned as-is; there is no fallback to the stub.
#[derive(Builder)]
pub struct BackendClient {
    #[builder(default)]
    client: Client,
    #[builder(into)]
    base_url: String,
    #[builder(into)]
    model: String,
    #[builder(into)]
    system_prompt: Option<String>,
    timeout: Duration,
    #[builder(default = 200)]
    preview_chars: usize,
}

impl BackendClient {
    pub fn from_config(cfg: &BackendConfig) -> Self {
        Self::builder()
            .base_url(cfg.base_url.clone())
            .model(cfg.model.clone())
            .maybe_system_prompt(cfg.system_prompt.clone())
            .timeout(cfg.request_timeout())
            .preview_chars(cfg.log_prompt_preview_chars)
            .build()
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn classify(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout { timeout_ms: self.timeout.as_millis() as u64 }
        } else if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }

    pub async fn chat(&self, prompt: &str) -> Result<String, BackendError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });
        let body = ChatRequest { model: &self.model, messages, stream: false };

        let url = self.chat_url();
        let prompt_preview: String = prompt.chars().take(self.preview_chars).collect();
        info!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            prompt_preview = %prompt_preview,
            "backend: chat request"
        );

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))
            .inspect_err(|e| warn!(error = %e, "backend: request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "backend: error status");
            return Err(BackendError::Status { status: status.as_u16(), body: text });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| self.classify(e))
            .inspect_err(|e| warn!(error = %e, "backend: response decode failed"))?;

        let text = parsed.message.content.trim().to_string();
        if text.is_empty() {
            warn!(model = %self.model, "backend: empty response");
            return Err(BackendError::EmptyResponse);
        }

        let response_preview: String = text.chars().take(self.preview_chars).collect();
        info!(
            model = %self.model,
            response_len = text.len(),
            response_preview = %response_preview,
            "backend: chat response"
        );
        Ok(text)
    }
}

#[async_trait]
impl Generator for BackendClient {
    fn mode(&self) -> GenerationMode {
        GenerationMode::Backend
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError> {
        let text = self.chat(prompt).await?;
        Ok(GenerationResult::builder()
            .text(text)
            .source(GenerationMode::Backend)
            .model(self.model.clone())
            .build())
    }
}
