//! # 解析器模块
//!
//! 把布局引擎产出的原始块转换为可翻译的文档结构：
//!
//! - LaTeX 片段空白规范化
//! - 内容分类（正文、表格、图片、公式、元数据）
//! - 段落重建（跨栏、跨页碎片合并）
//! - 布局引擎接口（content-list 文件、外部 MinerU 进程）
//!
//! # 模块组织
//!
//! - `latex` - LaTeX 片段规范化
//! - `classifier` - 布局块分类
//! - `paragraph` - 段落重建状态机
//! - `layout` - 原始块来源

pub mod classifier;
pub mod latex;
pub mod layout;
pub mod paragraph;

// Re-export commonly used items for convenience
pub use classifier::ContentClassifier;
pub use latex::{normalize, LatexSpanNormalizer};
pub use layout::{ContentListSource, LayoutSource, MineruSource};
pub use paragraph::{ParagraphReconstructor, ReconstructorConfig};

use crate::core::PaperResult;
use crate::document::{Document, Figure, RawBlock, Table};

/// 文档解析器
///
/// 段落走重建流程，表格、图片、公式和元数据按原样收集到旁路通道。
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    classifier: ContentClassifier,
    reconstructor: ParagraphReconstructor,
}

impl DocumentParser {
    pub fn new(config: ReconstructorConfig) -> Self {
        Self {
            classifier: ContentClassifier::new(),
            reconstructor: ParagraphReconstructor::new(config),
        }
    }

    /// 从有序原始块构建文档
    pub fn parse(&self, blocks: &[RawBlock]) -> Document {
        let paragraphs = self.reconstructor.reconstruct(blocks);

        let tables = blocks
            .iter()
            .filter(|b| self.classifier.is_table(b))
            .map(|b| Table {
                html: b.html.clone().unwrap_or_default(),
                caption: join_caption(&b.caption),
                page_index: b.page_index,
            })
            .collect();

        let figures = blocks
            .iter()
            .filter(|b| self.classifier.is_figure(b))
            .map(|b| Figure {
                path: b.path.clone().unwrap_or_default(),
                caption: join_caption(&b.caption),
                page_index: b.page_index,
            })
            .collect();

        let equations = blocks
            .iter()
            .filter(|b| self.classifier.is_equation(b))
            .map(|b| b.latex.clone().unwrap_or_else(|| b.extract_text()))
            .filter(|latex| !latex.trim().is_empty())
            .collect();

        let metadata = blocks
            .iter()
            .filter(|b| self.classifier.is_metadata(b))
            .cloned()
            .collect();

        Document {
            paragraphs,
            tables,
            figures,
            equations,
            metadata,
        }
    }

    /// 从布局来源加载并解析
    pub async fn parse_source(&self, source: &dyn LayoutSource) -> PaperResult<Document> {
        tracing::info!("解析文档: {}", source.describe());
        let blocks = source.load_blocks().await?;
        let document = self.parse(&blocks);
        tracing::info!(
            "解析完成: {} 段落, {} 表格, {} 图片, {} 公式",
            document.paragraphs.len(),
            document.tables.len(),
            document.figures.len(),
            document.equations.len()
        );
        Ok(document)
    }
}

fn join_caption(parts: &[String]) -> Option<String> {
    let caption = parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!caption.is_empty()).then_some(caption)
}
