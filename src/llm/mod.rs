pub mod providers;
pub mod segmentation;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// LLM provider types, all speaking the OpenAI-compatible chat protocol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    DeepSeek,
    OpenAI,
    Glm,
    Qwen,
}

impl LLMProvider {
    /// Default chat completions endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LLMProvider::DeepSeek => "https://api.deepseek.com/chat/completions",
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::Glm => "https://open.bigmodel.cn/api/paas/v4/chat/completions",
            LLMProvider::Qwen => {
                "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
            }
        }
    }

    /// Default model name for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::DeepSeek => "deepseek-chat",
            LLMProvider::OpenAI => "gpt-4o",
            LLMProvider::Glm => "glm-4-plus",
            LLMProvider::Qwen => "qwen-plus",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    /// Chat completions endpoint; falls back to the provider default
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Model name; falls back to the provider default when empty
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::DeepSeek,
            endpoint: None,
            api_key: None,
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse>;
    async fn is_available(&self) -> bool;
    fn provider_type(&self) -> LLMProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig) -> Result<Box<dyn LLM>> {
    Ok(Box::new(providers::ChatCompletionsProvider::new(config.clone())?))
}
