//! 翻译服务
//!
//! 把配置、提供方和批量翻译引擎组装在一起，是翻译功能的主要入口。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use paper_translator::translation::{TranslationConfig, TranslationService};
//!
//! let service = TranslationService::new(TranslationConfig::default_with_lang("ko"))?;
//! let translated = service.translate_document(&document, None).await;
//! println!("失败段落: {:?}", translated.failed_indices());
//! ```

use std::sync::Arc;

use super::engine::{BatchTranslationEngine, EngineStats, ProgressCallback};
use super::provider::{CompletionProvider, OpenAiProvider};
use crate::document::{Document, TranslatedDocument};
use crate::translation::config::TranslationConfig;
use crate::translation::error::{ErrorStats, TranslationError, TranslationResult};

/// 统一的翻译服务
pub struct TranslationService {
    config: TranslationConfig,
    engine: BatchTranslationEngine,
}

impl TranslationService {
    /// 使用 OpenAI 兼容提供方创建服务
    ///
    /// # 错误
    ///
    /// 配置无效或缺少 API 密钥时返回 `ConfigError`
    pub fn new(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        let provider = OpenAiProvider::from_config(&config)?;
        tracing::info!("翻译服务就绪: {} -> {}", provider.endpoint(), config.target_lang);
        Self::with_provider(config, Arc::new(provider))
    }

    /// 使用自定义提供方创建服务
    pub fn with_provider(
        config: TranslationConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> TranslationResult<Self> {
        config.validate()?;
        let engine = BatchTranslationEngine::new(provider, config.engine_config());
        Ok(Self { config, engine })
    }

    /// 翻译文档
    pub async fn translate_document(
        &self,
        document: &Document,
        on_batch_complete: Option<ProgressCallback>,
    ) -> TranslatedDocument {
        self.engine
            .translate(document, &self.config.target_lang, on_batch_complete)
            .await
    }

    /// 同步翻译文档
    ///
    /// 内部创建单线程运行时，不能在已有的 tokio 运行时中调用。
    pub fn translate_blocking(
        &self,
        document: &Document,
        on_batch_complete: Option<ProgressCallback>,
    ) -> TranslationResult<TranslatedDocument> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(TranslationError::ConcurrencyError(
                "translate_blocking 不能在异步运行时内调用".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TranslationError::InternalError(format!("创建运行时失败: {}", e)))?;

        Ok(runtime.block_on(self.translate_document(document, on_batch_complete)))
    }

    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn get_stats(&self) -> &EngineStats {
        self.engine.get_stats()
    }

    pub fn error_stats(&self) -> ErrorStats {
        self.engine.error_stats()
    }
}
