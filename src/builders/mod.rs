//! # 构建器模块
//!
//! 用于构建各种输出格式的构建器。
//!
//! # 模块组织
//!
//! - `markdown` - Markdown 导出

pub mod markdown;

// Re-export commonly used items for convenience
pub use markdown::{MarkdownBuilder, MarkdownBuilderConfig};
