//! # Paper Translator Library
//!
//! 把 PDF 布局引擎产出的论文块重建为段落，并在保留公式和位置信息的前提下批量翻译。
//!
//! ## 模块组织
//!
//! - `core` - 致命错误类型和端到端流程
//! - `document` - 文档数据模型
//! - `env` - 环境变量访问
//! - `parsers` - LaTeX 规范化、内容分类、段落重建、布局来源
//! - `translation` - 资格过滤、批量翻译引擎、提供方、配置
//! - `builders` - 输出格式构建器

pub mod builders;
pub mod core;
pub mod document;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use document::{
    BlockKind, BoundingBox, Document, Paragraph, ParagraphStatus, RawBlock, Region,
    TranslatedDocument,
};
pub use parsers::{DocumentParser, LatexSpanNormalizer, ParagraphReconstructor, ReconstructorConfig};
pub use translation::{
    BatchTranslationEngine, CompletionProvider, EngineConfig, TranslationConfig,
    TranslationEligibilityFilter, TranslationError, TranslationService,
};
