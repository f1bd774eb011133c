//! 翻译管道模块
//!
//! - `filters` - 翻译资格判断
//! - `batch` - 段落划分与批次切分

pub mod batch;
pub mod filters;

pub use batch::{create_batches, partition, TranslationBatch};
pub use filters::{should_skip, TranslationEligibilityFilter};
