//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值。
//! 优先级：默认值 < 配置文件 < 环境变量 < 命令行参数（由调用方覆盖）。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::parsers::ReconstructorConfig;
use crate::translation::core::engine::EngineConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub target_lang: String,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,

    // 批次与并发
    pub batch_size: usize,
    pub max_concurrent_requests: usize,
    pub request_timeout_secs: u64,
    pub max_batch_attempts: usize,
    pub retry_delay_ms: u64,

    // 段落重建
    pub column_jump_x: f64,
    pub column_jump_y: f64,
    pub strip_front_matter: bool,
    pub truncate_at_references: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
            model: constants::DEFAULT_MODEL.to_string(),

            batch_size: constants::DEFAULT_BATCH_SIZE,
            max_concurrent_requests: constants::DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_batch_attempts: constants::DEFAULT_MAX_BATCH_ATTEMPTS,
            retry_delay_ms: constants::DEFAULT_RETRY_DELAY_MS,

            column_jump_x: constants::DEFAULT_COLUMN_JUMP_X,
            column_jump_y: constants::DEFAULT_COLUMN_JUMP_Y,
            strip_front_matter: true,
            truncate_at_references: true,
        }
    }
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str) -> Self {
        Self {
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        if self.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.max_concurrent_requests == 0 {
            return Err(TranslationError::ConfigError("最大并发数不能为0".to_string()));
        }

        if self.max_concurrent_requests > constants::MAX_CONCURRENT_REQUESTS {
            return Err(TranslationError::ConfigError(format!(
                "最大并发数不能超过 {}",
                constants::MAX_CONCURRENT_REQUESTS
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时不能为0".to_string()));
        }

        if self.max_batch_attempts == 0 {
            return Err(TranslationError::ConfigError("批次尝试次数不能为0".to_string()));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TranslationError::ConfigError(format!(
                "API URL 必须以 http:// 或 https:// 开头: {}",
                self.api_url
            )));
        }

        let valid_threshold = |value: f64| value.is_finite() && value > 0.0;
        if !valid_threshold(self.column_jump_x) || !valid_threshold(self.column_jump_y) {
            return Err(TranslationError::ConfigError("换栏阈值必须是大于0的有限数".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{reconstruction, translation, EnvVar};

        if let Some(target_lang) = translation::TargetLang::lookup() {
            self.target_lang = target_lang;
        }

        if let Some(api_url) = translation::ApiUrl::lookup() {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(api_key) = translation::ApiKey::lookup() {
            self.api_key = Some(api_key);
        }

        if let Some(model) = translation::Model::lookup() {
            self.model = model;
        }

        if let Some(batch_size) = translation::BatchSize::lookup() {
            self.batch_size = batch_size;
        }

        if let Some(max_concurrent) = translation::MaxConcurrentRequests::lookup() {
            self.max_concurrent_requests = max_concurrent;
        }

        if let Some(timeout) = translation::RequestTimeout::lookup() {
            self.request_timeout_secs = timeout.as_secs();
        }

        if let Some(attempts) = translation::MaxBatchAttempts::lookup() {
            self.max_batch_attempts = attempts;
        }

        if let Some(delay) = translation::RetryDelayMs::lookup() {
            self.retry_delay_ms = delay;
        }

        // 段落重建相关环境变量
        if let Some(jump) = reconstruction::ColumnJumpX::lookup() {
            self.column_jump_x = jump;
        }

        if let Some(jump) = reconstruction::ColumnJumpY::lookup() {
            self.column_jump_y = jump;
        }

        if let Some(strip) = reconstruction::StripFrontMatter::lookup() {
            self.strip_front_matter = strip;
        }

        if let Some(truncate) = reconstruction::TruncateAtReferences::lookup() {
            self.truncate_at_references = truncate;
        }
    }

    /// 单次请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 重试延迟
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// 段落重建配置
    pub fn reconstructor_config(&self) -> ReconstructorConfig {
        ReconstructorConfig {
            column_jump_x: self.column_jump_x,
            column_jump_y: self.column_jump_y,
            strip_front_matter: self.strip_front_matter,
            truncate_at_references: self.truncate_at_references,
        }
    }

    /// 翻译引擎配置
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            batch_size: self.batch_size,
            max_concurrent_requests: self.max_concurrent_requests,
            request_timeout: self.request_timeout(),
            max_batch_attempts: self.max_batch_attempts,
            retry_delay: self.retry_delay(),
        }
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 搜索默认路径加载配置
    pub fn new() -> TranslationResult<Self> {
        let config = Self::load_config()?;
        Self::finish(config)
    }

    /// 从指定文件加载配置
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();
        let expanded = shellexpand::tilde(path);
        let config = Self::load_from_file(&expanded)?;
        Self::finish(config)
    }

    fn finish(mut config: TranslationConfig) -> TranslationResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 从默认路径加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置（TOML 或 JSON）
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path, e)))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
