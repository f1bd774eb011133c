//! 批量翻译引擎
//!
//! 把文档段落分批发送给翻译提供方，并把结果按原始下标写回。
//!
//! ## 主要功能
//! - **划分**: 通过资格过滤器把段落分为跳过集合和翻译集合，跳过的段落原样透传
//! - **批次处理**: 翻译集合按原始顺序切成不超过 `batch_size` 的批次，
//!   用分隔符拼接成一次请求
//! - **并发控制**: 所有请求（包括逐段回退请求）共用一个信号量，
//!   同时在途的请求数不超过 `max_concurrent_requests`
//! - **对齐校验**: 响应段数与提交段数不一致时整批重试，仍失败则逐段翻译
//! - **进度回调**: 每个批次完成后报告 (已完成段落数, 待翻译段落总数)
//! - **性能统计**: 原子计数器记录请求数、重试、回退和字符数
//!
//! ## 工作流程
//! 1. 划分跳过集合与翻译集合
//! 2. 切分批次
//! 3. 并发分发所有批次，每个请求带超时
//! 4. 校验响应段数，失败时重试或回退
//! 5. 按原始下标重组，最终失败的段落保留原文并标记为失败
//!
//! ## 使用示例
//! ```rust,ignore
//! let engine = BatchTranslationEngine::new(provider, EngineConfig::default());
//! let translated = engine.translate(&document, "ko", None).await;
//! assert_eq!(translated.document.paragraphs.len(), document.paragraphs.len());
//! ```

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use super::prompts;
use super::provider::CompletionProvider;
use crate::document::{Document, ParagraphStatus, TranslatedDocument};
use crate::translation::config::constants;
use crate::translation::error::{helpers, ErrorStats, TranslationError, TranslationResult};
use crate::translation::pipeline::{
    create_batches, partition, TranslationBatch, TranslationEligibilityFilter,
};

/// 进度回调：(已完成段落数, 待翻译段落总数)
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// 单个段落的翻译结果：(原始下标, 文本, 状态)
type ParagraphOutcome = (usize, String, ParagraphStatus);

/// 批量翻译引擎
///
/// 引擎本身不持有可变状态，`translate` 只需要 `&self`；
/// 统计信息使用原子计数器，错误统计使用互斥锁。
pub struct BatchTranslationEngine {
    provider: Arc<dyn CompletionProvider>,
    filter: TranslationEligibilityFilter,
    config: EngineConfig,
    stats: EngineStats,
    errors: Mutex<ErrorStats>,
}

impl BatchTranslationEngine {
    /// 创建新的翻译引擎
    ///
    /// # 参数
    /// - `provider`: 翻译提供方
    /// - `config`: 批次、并发和重试参数
    pub fn new(provider: Arc<dyn CompletionProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            filter: TranslationEligibilityFilter::new(),
            config,
            stats: EngineStats::default(),
            errors: Mutex::new(ErrorStats::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 翻译整篇文档
    ///
    /// 提供方错误不会中止文档：每个批次最终都会为其中每个段落给出文本，
    /// 逐段回退仍失败的段落保留原文并标记为 [`ParagraphStatus::Failed`]。
    ///
    /// # 参数
    /// - `document`: 待翻译文档
    /// - `target_lang`: 目标语言代码
    /// - `on_batch_complete`: 可选的进度回调
    ///
    /// # 返回值
    /// 段落数量、顺序、页码和区域与输入完全一致的翻译结果
    pub async fn translate(
        &self,
        document: &Document,
        target_lang: &str,
        on_batch_complete: Option<ProgressCallback>,
    ) -> TranslatedDocument {
        let paragraphs = &document.paragraphs;
        let (skip, translate) = partition(paragraphs, &self.filter);
        let batches = create_batches(paragraphs, &translate, self.config.batch_size);
        let total = translate.len();

        tracing::info!(
            "开始翻译: {} 段落，跳过 {}，{} 个批次，并发上限 {}",
            paragraphs.len(),
            skip.len(),
            batches.len(),
            self.config.max_concurrent_requests
        );

        let mut statuses = vec![ParagraphStatus::Skipped; paragraphs.len()];
        let mut output = paragraphs.clone();

        let semaphore = Semaphore::new(
            self.config
                .max_concurrent_requests
                .clamp(1, Semaphore::MAX_PERMITS),
        );
        let completed = AtomicUsize::new(0);

        let tasks = batches.iter().map(|batch| {
            let semaphore = &semaphore;
            let completed = &completed;
            let on_batch_complete = on_batch_complete.clone();
            async move {
                let outcomes = self.process_batch(batch, target_lang, semaphore).await;
                let done = completed.fetch_add(batch.len(), Ordering::SeqCst) + batch.len();
                if let Some(callback) = on_batch_complete {
                    callback(done, total);
                }
                outcomes
            }
        });

        for (index, text, status) in join_all(tasks).await.into_iter().flatten() {
            output[index] = paragraphs[index].with_text(text);
            statuses[index] = status;
        }

        let translated = TranslatedDocument {
            document: document.with_paragraphs(output),
            statuses,
        };

        let failed = translated.failed_indices();
        if failed.is_empty() {
            tracing::info!("翻译完成: {} 段落", total);
        } else {
            tracing::warn!("翻译完成，{} 个段落保留原文: {:?}", failed.len(), failed);
        }

        translated
    }

    /// 处理单个批次：整批请求，失败时重试，最后逐段回退
    async fn process_batch(
        &self,
        batch: &TranslationBatch,
        target_lang: &str,
        semaphore: &Semaphore,
    ) -> Vec<ParagraphOutcome> {
        let attempts = self.config.max_batch_attempts.max(1);

        tracing::debug!(
            "处理批次 {}: {} 段落，{} 字符",
            batch.id,
            batch.len(),
            batch.char_count()
        );

        for attempt in 1..=attempts {
            match self.request_batch(batch, target_lang, semaphore).await {
                Ok(segments) => {
                    self.stats.inc_batches_processed();
                    return batch
                        .indices
                        .iter()
                        .copied()
                        .zip(segments)
                        .map(|(index, text)| (index, text, ParagraphStatus::Translated))
                        .collect();
                }
                Err(e) => {
                    self.record_error(&e);
                    tracing::warn!(
                        "批次 {} 第 {}/{} 次尝试失败: {}",
                        batch.id,
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        self.stats.inc_batch_retries();
                        if !self.config.retry_delay.is_zero() {
                            sleep(self.config.retry_delay).await;
                        }
                    }
                }
            }
        }

        tracing::warn!("批次 {} 重试耗尽，回退到逐段翻译 {} 段落", batch.id, batch.len());
        self.stats.add_individual_fallbacks(batch.len());
        self.stats.inc_batches_processed();

        let singles = batch
            .texts
            .iter()
            .map(|text| self.translate_single(text, target_lang, semaphore));
        let results = join_all(singles).await;

        batch
            .indices
            .iter()
            .zip(&batch.texts)
            .zip(results)
            .map(|((&index, original), result)| match result {
                Ok(text) => (index, text, ParagraphStatus::Translated),
                Err(e) => {
                    self.record_error(&e);
                    self.stats.inc_failed_paragraphs();
                    tracing::error!("段落 {} 逐段翻译失败，保留原文: {}", index, e);
                    (
                        index,
                        original.clone(),
                        ParagraphStatus::Failed {
                            reason: e.to_string(),
                        },
                    )
                }
            })
            .collect()
    }

    /// 发送整批请求并校验段数
    async fn request_batch(
        &self,
        batch: &TranslationBatch,
        target_lang: &str,
        semaphore: &Semaphore,
    ) -> TranslationResult<Vec<String>> {
        let system = prompts::batch_system_prompt(target_lang);
        let payload = prompts::join_batch(&batch.texts);

        let response = self.call(&system, &payload, semaphore).await?;
        let segments = prompts::split_response(&response);

        if segments.len() != batch.len() {
            return Err(TranslationError::AlignmentMismatch {
                expected: batch.len(),
                actual: segments.len(),
            });
        }

        Ok(segments)
    }

    /// 单段翻译，跳过的文本原样返回且不发送请求
    async fn translate_single(
        &self,
        text: &str,
        target_lang: &str,
        semaphore: &Semaphore,
    ) -> TranslationResult<String> {
        if self.filter.should_skip(text) {
            return Ok(text.to_string());
        }

        let system = prompts::single_system_prompt(target_lang);
        let response = self.call(&system, text, semaphore).await?;
        Ok(response.trim().to_string())
    }

    /// 受信号量和超时约束的提供方调用
    async fn call(
        &self,
        system: &str,
        user: &str,
        semaphore: &Semaphore,
    ) -> TranslationResult<String> {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| TranslationError::ConcurrencyError(format!("信号量已关闭: {}", e)))?;

        self.stats.inc_provider_calls();
        self.stats.add_characters_sent(user.chars().count());

        let response = timeout(self.config.request_timeout, self.provider.complete(system, user))
            .await
            .map_err(|_| {
                TranslationError::TimeoutError(format!(
                    "{} 请求超过 {:?}",
                    self.provider.name(),
                    self.config.request_timeout
                ))
            })??;

        self.stats.add_characters_received(response.chars().count());
        Ok(response)
    }

    fn record_error(&self, error: &TranslationError) {
        helpers::log_error(error);
        if let Ok(mut errors) = self.errors.lock() {
            errors.record_error(error);
        }
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> &EngineStats {
        &self.stats
    }

    /// 提供方错误统计快照
    pub fn error_stats(&self) -> ErrorStats {
        self.errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    /// 重置统计信息
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        if let Ok(mut errors) = self.errors.lock() {
            errors.reset();
        }
    }
}

/// 翻译引擎配置
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// 每批最多段落数
    pub batch_size: usize,

    /// 同时在途的请求上限
    pub max_concurrent_requests: usize,

    /// 单次请求超时，超时按提供方错误处理
    pub request_timeout: Duration,

    /// 整批尝试次数（含首次），耗尽后逐段回退
    pub max_batch_attempts: usize,

    /// 整批重试前的等待时间
    pub retry_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::DEFAULT_BATCH_SIZE,
            max_concurrent_requests: constants::DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout: constants::DEFAULT_REQUEST_TIMEOUT,
            max_batch_attempts: constants::DEFAULT_MAX_BATCH_ATTEMPTS,
            retry_delay: Duration::from_millis(constants::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl EngineConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// 翻译引擎统计信息（线程安全版本）
///
/// 所有计数器都是累加的，使用 Relaxed 内存顺序。
#[derive(Debug, Default)]
pub struct EngineStats {
    /// 提供方调用次数（整批与逐段）
    pub provider_calls: AtomicUsize,
    /// 已完成的批次数（包括走了逐段回退的批次）
    pub batches_processed: AtomicUsize,
    /// 整批重试次数
    pub batch_retries: AtomicUsize,
    /// 走逐段回退的段落数
    pub individual_fallbacks: AtomicUsize,
    /// 最终失败、保留原文的段落数
    pub failed_paragraphs: AtomicUsize,
    /// 发送字符数
    pub characters_sent: AtomicUsize,
    /// 接收字符数
    pub characters_received: AtomicUsize,
}

impl EngineStats {
    pub fn inc_provider_calls(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batches_processed(&self) {
        self.batches_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batch_retries(&self) {
        self.batch_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_individual_fallbacks(&self, count: usize) {
        self.individual_fallbacks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_failed_paragraphs(&self) {
        self.failed_paragraphs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_characters_sent(&self, count: usize) {
        self.characters_sent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_characters_received(&self, count: usize) {
        self.characters_received.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn get_batches_processed(&self) -> usize {
        self.batches_processed.load(Ordering::Relaxed)
    }

    pub fn get_batch_retries(&self) -> usize {
        self.batch_retries.load(Ordering::Relaxed)
    }

    pub fn get_individual_fallbacks(&self) -> usize {
        self.individual_fallbacks.load(Ordering::Relaxed)
    }

    pub fn get_failed_paragraphs(&self) -> usize {
        self.failed_paragraphs.load(Ordering::Relaxed)
    }

    /// 重置统计信息
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}
