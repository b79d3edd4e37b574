//! Chat-completion backend abstraction.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use leadflow_core::config::{LlmConfig, LlmProvider};

const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-turn completion: system instruction plus one user message.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// HTTP client for OpenAI-compatible chat-completion APIs (OpenAI itself,
/// or an Ollama server's `/v1` endpoint).
pub struct ChatCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let base_url = match config.provider {
            LlmProvider::OpenAi => {
                config.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string())
            }
            LlmProvider::Ollama => config
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("ollama provider requires llm.base_url"))?,
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system_prompt.to_string() },
                ChatMessage { role: "user".to_string(), content: user_prompt.to_string() },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut builder =
            self.client.post(format!("{}/v1/chat/completions", self.base_url)).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.context("llm request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("llm backend returned {status}: {body}"));
        }

        let completion: ChatCompletionResponse =
            response.json().await.context("llm response was not valid json")?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("llm response contained no choices"))?;

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use leadflow_core::config::{AppConfig, LlmProvider};

    use super::ChatCompletionClient;

    #[test]
    fn openai_provider_defaults_to_the_public_endpoint() {
        let config = AppConfig::default().llm;
        let client = ChatCompletionClient::from_config(&config).expect("client builds");
        assert_eq!(client.base_url, "https://api.openai.com");
    }

    #[test]
    fn ollama_provider_requires_a_base_url() {
        let mut config = AppConfig::default().llm;
        config.provider = LlmProvider::Ollama;
        config.base_url = None;

        assert!(ChatCompletionClient::from_config(&config).is_err());

        config.base_url = Some("http://localhost:11434/".to_string());
        let client = ChatCompletionClient::from_config(&config).expect("client builds");
        assert_eq!(client.base_url, "http://localhost:11434", "trailing slash is trimmed");
    }
}
