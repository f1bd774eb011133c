//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。
//! 这些错误都在批次粒度上可恢复：引擎会重试、回退到逐段翻译，
//! 永远不会让它们中止整篇文档。

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimitExceeded,

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译服务错误
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 批次响应段数与提交段数不一致
    #[error("分隔段数不匹配: 期望 {expected}，得到 {actual}")]
    AlignmentMismatch { expected: usize, actual: usize },

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 并发错误
    #[error("并发操作错误: {0}")]
    ConcurrencyError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::TimeoutError(_) => true,
            TranslationError::TranslationServiceError(_) => true,
            TranslationError::AlignmentMismatch { .. } => true,
            TranslationError::RateLimitExceeded => true,
            TranslationError::ConcurrencyError(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::ParseError(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::TranslationServiceError(_) => ErrorSeverity::Error,
            TranslationError::TimeoutError(_) => ErrorSeverity::Warning,
            TranslationError::AlignmentMismatch { .. } => ErrorSeverity::Warning,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::ConcurrencyError(_) => ErrorSeverity::Warning,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::RateLimitExceeded => ErrorCategory::RateLimit,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::TranslationServiceError(_) => ErrorCategory::Service,
            TranslationError::TimeoutError(_) => ErrorCategory::Timeout,
            TranslationError::AlignmentMismatch { .. } => ErrorCategory::Alignment,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::ConcurrencyError(_) => ErrorCategory::Concurrency,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self, context);

        match &mut self {
            TranslationError::ConfigError(msg)
            | TranslationError::NetworkError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::TranslationServiceError(msg)
            | TranslationError::TimeoutError(msg)
            | TranslationError::ParseError(msg)
            | TranslationError::SerializationError(msg)
            | TranslationError::ConcurrencyError(msg)
            | TranslationError::InternalError(msg) => *msg = new_msg,
            TranslationError::RateLimitExceeded | TranslationError::AlignmentMismatch { .. } => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RateLimit,
    Input,
    Service,
    Timeout,
    Alignment,
    Parsing,
    Serialization,
    Concurrency,
    Internal,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::NetworkError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(format!("请求超时: {}", error))
        } else if error.status().map_or(false, |s| s.as_u16() == 429) {
            TranslationError::RateLimitExceeded
        } else if error.is_decode() {
            TranslationError::ParseError(format!("响应解析失败: {}", error))
        } else if error.is_status() {
            TranslationError::TranslationServiceError(format!("HTTP错误: {}", error))
        } else {
            TranslationError::NetworkError(format!("HTTP请求失败: {}", error))
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误统计信息
#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub total_errors: usize,
    pub by_category: HashMap<ErrorCategory, usize>,
    pub by_severity: HashMap<ErrorSeverity, usize>,
    pub retryable_errors: usize,
    pub critical_errors: usize,
}

impl ErrorStats {
    /// 记录错误
    pub fn record_error(&mut self, error: &TranslationError) {
        self.total_errors += 1;

        let category = error.category();
        *self.by_category.entry(category).or_insert(0) += 1;

        let severity = error.severity();
        *self.by_severity.entry(severity).or_insert(0) += 1;

        if error.is_retryable() {
            self.retryable_errors += 1;
        }

        if severity == ErrorSeverity::Critical {
            self.critical_errors += 1;
        }
    }

    /// 某类错误的次数
    pub fn count(&self, category: ErrorCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    /// 获取错误率
    pub fn error_rate(&self, total_operations: usize) -> f64 {
        if total_operations == 0 {
            0.0
        } else {
            self.total_errors as f64 / total_operations as f64
        }
    }
}

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_mismatch_is_retryable_warning() {
        let error = TranslationError::AlignmentMismatch {
            expected: 25,
            actual: 24,
        };

        assert!(error.is_retryable());
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert_eq!(error.category(), ErrorCategory::Alignment);
        assert!(error.to_string().contains("25"));
    }

    #[test]
    fn test_with_context_appends_message() {
        let error = TranslationError::NetworkError("connection reset".to_string())
            .with_context("batch 3");

        match error {
            TranslationError::NetworkError(msg) => {
                assert!(msg.contains("connection reset"));
                assert!(msg.contains("batch 3"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_error_stats_records_categories() {
        let mut stats = ErrorStats::default();
        stats.record_error(&TranslationError::TimeoutError("60s".to_string()));
        stats.record_error(&TranslationError::TimeoutError("60s".to_string()));
        stats.record_error(&TranslationError::ConfigError("bad".to_string()));

        assert_eq!(stats.total_errors, 3);
        assert_eq!(stats.count(ErrorCategory::Timeout), 2);
        assert_eq!(stats.critical_errors, 1);
        assert_eq!(stats.retryable_errors, 2);
        assert!((stats.error_rate(6) - 0.5).abs() < f64::EPSILON);

        stats.reset();
        assert_eq!(stats.total_errors, 0);
    }
}
