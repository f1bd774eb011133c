//! 翻译服务提供方
//!
//! 引擎只依赖一个操作：`complete(system, user) -> text`。
//! [`OpenAiProvider`] 实现 OpenAI 兼容的 `/chat/completions` 接口，
//! 测试中可以替换为任意实现了 [`CompletionProvider`] 的假实现。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 文本补全接口
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 发送一对 system/user 消息，返回模型的文本回复
    async fn complete(&self, system: &str, user: &str) -> TranslationResult<String>;

    /// 提供方名称，用于日志
    fn name(&self) -> &str {
        "provider"
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 兼容的 HTTP 提供方
pub struct OpenAiProvider {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// 创建提供方
    ///
    /// # 参数
    ///
    /// * `api_url` - API 根地址，例如 `https://api.openai.com/v1`
    /// * `api_key` - Bearer 密钥，不能为空
    /// * `model` - 模型名称
    /// * `timeout` - 单次 HTTP 请求超时
    pub fn new(
        api_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> TranslationResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranslationError::ConfigError(
                "缺少 API 密钥，请设置 OPENAI_API_KEY 或 PAPER_API_KEY".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: chat_endpoint(api_url),
            api_key,
            model: model.into(),
        })
    }

    /// 从翻译配置创建
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        let api_key = config.api_key.clone().unwrap_or_default();
        Self::new(&config.api_url, api_key, &config.model, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> TranslationResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TranslationError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::TranslationServiceError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TranslationError::ParseError("响应中没有内容".to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn chat_endpoint(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}
