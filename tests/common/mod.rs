// 集成测试公共模块
//
// 提供假翻译提供方和测试文档生成工具

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use paper_translator::document::{BoundingBox, Document, Paragraph, Region};
use paper_translator::translation::core::prompts::SEPARATOR;
use paper_translator::translation::{CompletionProvider, TranslationError, TranslationResult};

/// 假提供方的行为
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FakeMode {
    /// 每段加上 `[T] ` 前缀
    Echo,
    /// 第一次整批请求少返回一段，之后正常
    MismatchOnce,
    /// 整批请求总是只返回一段，逐段请求正常
    AlwaysMismatch,
    /// 所有请求都失败
    Failing,
}

/// 记录调用情况的假提供方
pub struct FakeProvider {
    mode: FakeMode,
    delay: Duration,
    mismatched: AtomicBool,
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub single_inputs: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(mode: FakeMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            mismatched: AtomicBool::new(false),
            batch_calls: AtomicUsize::new(0),
            single_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            single_inputs: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用前等待，用于观察并发
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, is_batch: bool, user: &str) -> TranslationResult<String> {
        if self.mode == FakeMode::Failing {
            return Err(TranslationError::NetworkError("connection refused".to_string()));
        }

        let mut segments: Vec<String> = user
            .split(SEPARATOR)
            .map(|segment| translate(segment.trim()))
            .collect();

        if is_batch {
            let mismatch = match self.mode {
                FakeMode::MismatchOnce => !self.mismatched.swap(true, Ordering::SeqCst),
                FakeMode::AlwaysMismatch => true,
                _ => false,
            };
            if mismatch {
                segments = vec![segments.join(" ")];
            }
        }

        Ok(segments.join(&format!("\n{}\n", SEPARATOR)))
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, system: &str, user: &str) -> TranslationResult<String> {
        let is_batch = system.contains(SEPARATOR);
        if is_batch {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
        } else {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            self.single_inputs.lock().unwrap().push(user.to_string());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = self.respond(is_batch, user);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// 假翻译结果
pub fn translate(text: &str) -> String {
    format!("[T] {}", text)
}

/// 生成 `count` 个可翻译段落，每页 10 段
pub fn prose_document(count: usize) -> Document {
    Document::from_paragraphs(
        (0..count)
            .map(|i| {
                let y = (i % 10) as f64 * 90.0;
                let region = Region::new(BoundingBox::new(60.0, y, 940.0, y + 80.0), i / 10);
                Paragraph::new(format!("Paragraph number {} describes the method.", i), region)
            })
            .collect(),
    )
}

/// 由给定文本生成文档，第 i 段位于第 i 页
pub fn document_from(texts: &[&str]) -> Document {
    Document::from_paragraphs(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Paragraph::new(*text, Region::new(BoundingBox::new(60.0, 100.0, 940.0, 200.0), i))
            })
            .collect(),
    )
}

/// 一篇小论文的 content-list JSON
pub fn sample_content_list() -> &'static str {
    r#"[
        {"type": "text", "text": "Sparse Attention at Scale", "text_level": 1, "page_idx": 0, "bbox": [120, 60, 880, 100]},
        {"type": "text", "text": "Jane Doe, University of Somewhere", "page_idx": 0, "bbox": [300, 110, 700, 130]},
        {"type": "text", "text": "Abstract We present a sparse attention scheme.", "page_idx": 0, "bbox": [120, 150, 880, 260]},
        {"type": "text", "text": "1 Introduction", "text_level": 1, "page_idx": 0, "bbox": [120, 280, 400, 300]},
        {"type": "text", "text": "Transformers scale quadratically with", "page_idx": 0, "bbox": [120, 310, 480, 900]},
        {"type": "text", "text": "sequence length $n ^ { 2 }$ in memory.", "page_idx": 1, "bbox": [120, 80, 480, 200]},
        {"type": "equation", "text": "$$\\mathrm { A } = Q K ^ { T }$$", "text_format": "latex", "page_idx": 1, "bbox": [120, 210, 480, 250]},
        {"type": "table", "table_body": "<table><tr><td>1</td></tr></table>", "table_caption": ["Table 1: Speed"], "page_idx": 1, "bbox": [100, 100, 900, 300]},
        {"type": "page_number", "text": "1", "page_idx": 0, "bbox": [490, 960, 510, 980]},
        {"type": "text", "text": "This work was supported by a grant from the Foundation.", "page_idx": 1, "bbox": [120, 900, 880, 940]},
        {"type": "text", "text": "REFERENCES", "text_level": 1, "page_idx": 1, "bbox": [120, 400, 400, 420]},
        {"type": "text", "text": "[1] Vaswani et al. Attention is all you need.", "page_idx": 1, "bbox": [120, 430, 880, 460]}
    ]"#
}
