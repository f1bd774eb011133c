//! 翻译模块
//!
//! 提供论文段落的批量翻译功能：
//! - **core**: 翻译服务、批量引擎、提供方接口和提示词
//! - **pipeline**: 翻译资格过滤和批次切分
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use paper_translator::document::Document;
//! use paper_translator::translation::{TranslationConfig, TranslationService};
//!
//! # async fn example(document: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let service = TranslationService::new(TranslationConfig::default_with_lang("ko"))?;
//! let translated = service.translate_document(&document, None).await;
//! println!("失败段落: {:?}", translated.failed_indices());
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 核心翻译引擎模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 翻译管道模块 - 资格过滤和批次切分
pub mod pipeline;

pub use config::{constants, ConfigManager, TranslationConfig};
pub use self::core::{
    BatchTranslationEngine, CompletionProvider, EngineConfig, EngineStats, OpenAiProvider,
    ProgressCallback, TranslationService,
};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use pipeline::{should_skip, TranslationBatch, TranslationEligibilityFilter};
