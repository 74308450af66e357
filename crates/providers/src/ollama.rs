use crate::{ChatBackend, ProviderStatus};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;
use shared::settings::ModelProvider;
use std::env;
use std::time::Duration;

/// Upper bound for the startup probe, independent of the chat timeout.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize, Deserialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

pub struct OllamaClient {
    http: Client,
    base: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base: &str, model: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(2);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build().context("failed to build HTTP client")?,
            base: base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Build from settings; `OLLAMA_BASE_URL` overrides the configured base.
    pub fn from_settings(config: &ModelProvider) -> Result<Self> {
        let base = env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| config.ollama_base_url.clone());
        Self::new(
            &base,
            &config.local_model,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Probe `/api/tags`; never fails, only reports.
    pub async fn health_check(&self) -> ProviderStatus {
        let url = format!("{}/api/tags", self.base);
        match self
            .http
            .get(url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => ProviderStatus::Available,
            Ok(resp) => ProviderStatus::Unavailable {
                reason: format!("ollama returned {}", resp.status()),
            },
            Err(e) => ProviderStatus::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    pub async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let conversation: Vec<OllamaMessage> = messages
            .into_iter()
            .map(|m| OllamaMessage {
                role: m.role,
                content: m.content,
            })
            .collect();
        let url = format!("{}/api/chat", self.base);
        let req = OllamaChatRequest {
            model: &self.model,
            messages: conversation,
            stream: false,
        };
        tracing::debug!(model = %self.model, url = %url, "ollama chat request");
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(anyhow!("ollama error {}: {}", status, snippet));
        }
        let body: OllamaChatResponse = resp.json().await?;
        Ok(body.message.content)
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.generate(messages).await
    }
}
