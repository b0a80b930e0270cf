//! Language-model provider abstraction.
//!
//! The orchestrator consumes one injected capability: `generate(prompt,
//! provider, model) -> LmResponse`. `HttpLmProvider` implements it over
//! any OpenAI-compatible chat-completions endpoint; `MockLmProvider`
//! serves queued canned responses for tests.

use crate::error::LmError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// The content produced by one LM call.
#[derive(Debug, Clone)]
pub struct LmResponse {
    pub content: String,
}

#[async_trait]
pub trait LmProvider: Send + Sync {
    /// Generate a completion for the prompt using the given provider/model
    /// pair.
    async fn generate(
        &self,
        prompt: &str,
        provider: &str,
        model: &str,
    ) -> Result<LmResponse, LmError>;
}

/// OpenAI-compatible chat-completions client.
///
/// The `provider` tag picks the endpoint base: `openai`, `groq` and
/// `openrouter` map to their public APIs; anything else uses the OpenAI
/// base unless an explicit override is set.
pub struct HttpLmProvider {
    client: Client,
    api_key: String,
    base_url_override: Option<String>,
}

impl HttpLmProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url_override: None,
        }
    }

    /// Point at a non-default endpoint (Azure, vLLM, a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    fn base_url_for(&self, provider: &str) -> String {
        if let Some(ref override_url) = self.base_url_override {
            return override_url.clone();
        }
        match provider {
            "groq" => "https://api.groq.com/openai/v1".to_string(),
            "openrouter" => "https://openrouter.ai/api/v1".to_string(),
            _ => "https://api.openai.com/v1".to_string(),
        }
    }

    fn parse_content(body: &Value) -> Result<String, LmError> {
        body.get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| LmError::ResponseParse {
                message: "response has no choices[0].message.content".into(),
            })
    }
}

#[async_trait]
impl LmProvider for HttpLmProvider {
    async fn generate(
        &self,
        prompt: &str,
        provider: &str,
        model: &str,
    ) -> Result<LmResponse, LmError> {
        let url = format!("{}/chat/completions", self.base_url_for(provider));
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0,
        });

        debug!(provider, model, prompt_chars = prompt.len(), "LM request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LmError::Connection {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LmError::AuthFailed {
                provider: provider.to_string(),
            });
        }
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);
            return Err(LmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(256).collect();
            return Err(LmError::ApiRequest {
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        let body: Value = response.json().await.map_err(|e| LmError::ResponseParse {
            message: e.to_string(),
        })?;

        Ok(LmResponse {
            content: Self::parse_content(&body)?,
        })
    }
}

/// A mock LM for testing and development.
///
/// Serves queued responses in order; once drained, returns a fixed canned
/// answer. Queued errors are surfaced exactly once each.
pub struct MockLmProvider {
    responses: Mutex<VecDeque<Result<LmResponse, LmError>>>,
    calls: AtomicUsize,
}

impl MockLmProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a text response for the next `generate` call.
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(LmResponse {
            content: text.into(),
        }));
    }

    /// Queue an error for the next `generate` call.
    pub fn queue_error(&self, error: LmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// How many times `generate` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LmProvider for MockLmProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _provider: &str,
        _model: &str,
    ) -> Result<LmResponse, LmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(queued) => queued,
            None => Ok(LmResponse {
                content: "Mock LM: no queued responses available.".to_string(),
            }),
        }
    }
}
