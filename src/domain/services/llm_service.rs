// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::LlmSettings;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// LLM 调用错误
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM API key not configured")]
    NotConfigured,
    #[error("Failed to send request to LLM API: {0}")]
    Request(String),
    #[error("LLM API returned error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response format from LLM API: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Request(err.to_string())
    }
}

/// 一次对话补全请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// 为空时使用配置的默认值
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 对话补全结果
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, LlmError>;

    /// 是否配置了可用的 API 密钥
    fn is_configured(&self) -> bool;
}

/// OpenAI 兼容的对话补全客户端
///
/// # 配置
///
/// 读取 [`LlmSettings`]：
/// - `api_key` - API密钥，缺失时所有调用返回 [`LlmError::NotConfigured`]
/// - `model` - 模型名称（默认为 gpt-4-turbo-preview）
/// - `api_base_url` - API基础URL，请求发往 `{api_base_url}/chat/completions`
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            frequency_penalty: settings.frequency_penalty,
            presence_penalty: settings.presence_penalty,
        })
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "max_tokens": request.max_tokens.unwrap_or(self.max_tokens),
            "temperature": request.temperature.unwrap_or(self.temperature),
            "top_p": self.top_p,
            "frequency_penalty": self.frequency_penalty,
            "presence_penalty": self.presence_penalty
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::NotConfigured)?;

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&self.request_body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let usage = body
            .get("usage")
            .map(|usage_val| TokenUsage {
                prompt_tokens: usage_val["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_val["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_val["total_tokens"].as_u64().unwrap_or(0) as u32,
            })
            .unwrap_or_default();

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".into()))?;

        Ok(ChatCompletion {
            content: content.trim().to_string(),
            usage,
        })
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
