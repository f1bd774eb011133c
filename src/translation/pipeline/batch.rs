//! 翻译批次模块
//!
//! 把文档段落划分为跳过集合与翻译集合，再把翻译集合按原始顺序切成
//! 不超过 `batch_size` 的批次。批次只在分发期间存在，不做持久化。
//!
//! ## 使用示例
//!
//! ```rust
//! use paper_translator::translation::pipeline::batch::{create_batches, partition};
//! use paper_translator::translation::pipeline::TranslationEligibilityFilter;
//! use paper_translator::document::{Paragraph, Region};
//!
//! let paragraphs = vec![
//!     Paragraph::new("Deep networks generalize well.", Region::default()),
//!     Paragraph::new("$x^2$", Region::default()),
//! ];
//! let (skip, translate) = partition(&paragraphs, &TranslationEligibilityFilter::new());
//! let batches = create_batches(&paragraphs, &translate, 25);
//!
//! assert_eq!(skip, vec![1]);
//! assert_eq!(batches.len(), 1);
//! ```

use crate::document::Paragraph;
use crate::translation::pipeline::filters::TranslationEligibilityFilter;

/// 翻译批次
///
/// `indices[i]` 是 `texts[i]` 在原文档中的段落下标。
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBatch {
    /// 批次编号（按原始顺序递增）
    pub id: usize,
    /// 原文档段落下标
    pub indices: Vec<usize>,
    /// 待翻译文本
    pub texts: Vec<String>,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 批次总字符数
    pub fn char_count(&self) -> usize {
        self.texts.iter().map(|t| t.chars().count()).sum()
    }
}

/// 按翻译资格划分段落下标
///
/// # 返回值
///
/// `(skip, translate)`，两个集合互不相交且都保持原始相对顺序
pub fn partition(
    paragraphs: &[Paragraph],
    filter: &TranslationEligibilityFilter,
) -> (Vec<usize>, Vec<usize>) {
    (0..paragraphs.len()).partition(|&index| filter.should_skip(paragraphs[index].text()))
}

/// 把翻译集合切成有序批次
///
/// # 参数
///
/// * `paragraphs` - 文档段落
/// * `indices` - 翻译集合（原始顺序）
/// * `batch_size` - 每批最多段落数，0 按 1 处理
pub fn create_batches(
    paragraphs: &[Paragraph],
    indices: &[usize],
    batch_size: usize,
) -> Vec<TranslationBatch> {
    indices
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(id, chunk)| TranslationBatch {
            id,
            indices: chunk.to_vec(),
            texts: chunk
                .iter()
                .map(|&index| paragraphs[index].text().to_string())
                .collect(),
        })
        .collect()
}
