use super::{ChatMessage, LLM, LLMConfig, LLMProvider, LLMResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Chat completions provider covering every configured vendor.
///
/// DeepSeek, GLM and Qwen all expose OpenAI-compatible endpoints, so one
/// implementation parameterized by endpoint and model serves them all.
pub struct ChatCompletionsProvider {
    config: LLMConfig,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("API key not configured for {:?}", config.provider));
        }

        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| config.provider.default_endpoint().to_string());
        let model = if config.model.is_empty() {
            config.provider.default_model().to_string()
        } else {
            config.model.clone()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, endpoint, model, client })
    }
}

#[async_trait]
impl LLM for ChatCompletionsProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("API key not configured for {:?}", self.config.provider))?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending chat request to {:?} at {}", self.config.provider, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("{:?} API error {}: {}", self.config.provider, status, text));
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| anyhow!("No response from {:?}", self.config.provider))?
            .message
            .content
            .clone();

        let tokens_used = chat_response.usage.map(|u| u.total_tokens);

        Ok(LLMResponse { content, tokens_used })
    }

    async fn is_available(&self) -> bool {
        let api_key = match &self.config.api_key {
            Some(key) => key,
            None => return false,
        };

        // Every compatible vendor serves a models listing next to the chat
        // endpoint.
        let models_endpoint = self.endpoint.replace("/chat/completions", "/models");

        match self.client.get(&models_endpoint).bearer_auth(api_key).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        self.config.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_resolves_defaults() {
        let provider = ChatCompletionsProvider::new(LLMConfig {
            provider: LLMProvider::Glm,
            api_key: Some("key".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(provider.model, "glm-4-plus");
        assert!(provider.endpoint.contains("bigmodel.cn"));
    }

    #[test]
    fn test_explicit_endpoint_and_model_win() {
        let provider = ChatCompletionsProvider::new(LLMConfig {
            provider: LLMProvider::OpenAI,
            endpoint: Some("http://localhost:8080/v1/chat/completions".to_string()),
            api_key: Some("key".to_string()),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(provider.model, "gpt-4o-mini");
        assert!(provider.endpoint.starts_with("http://localhost:8080"));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        assert!(ChatCompletionsProvider::new(LLMConfig::default()).is_err());
    }
}
