//! 文档数据模型
//!
//! 定义布局引擎产出的原始块、重建后的段落以及贯穿翻译流程的文档结构。
//!
//! ## 主要类型
//! - **RawBlock**: 布局引擎检测到的单个内容单元（直接从 content-list JSON 反序列化）
//! - **Region**: 段落占据的一个空间位置（边界框 + 页码）
//! - **Paragraph**: 逻辑段落，可能由多个原始块合并而成
//! - **Document**: 段落序列 + 原样透传的表格、图片、公式和元数据
//! - **TranslatedDocument**: 翻译结果及每个段落的状态标记
//!
//! 坐标统一使用布局引擎的 0-1000 归一化坐标系。

use serde::{Deserialize, Deserializer, Serialize};

/// 归一化坐标系中的边界框 (x_min, y_min, x_max, y_max)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(raw: [f64; 4]) -> Self {
        Self::new(raw[0], raw[1], raw[2], raw[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max]
    }
}

/// 段落的一个空间位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "page")]
    pub page_index: usize,
}

impl Region {
    pub fn new(bounding_box: BoundingBox, page_index: usize) -> Self {
        Self {
            bounding_box,
            page_index,
        }
    }
}

/// 布局块类型
///
/// 未知类型统一反序列化为 `Other`，由分类器丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[serde(alias = "paragraph")]
    Text,
    Title,
    List,
    Table,
    #[serde(alias = "figure")]
    Image,
    Equation,
    Header,
    Footer,
    PageNumber,
    AsideText,
    PageFootnote,
    Code,
    #[default]
    #[serde(other)]
    Other,
}

/// 布局引擎检测到的单个内容单元
///
/// 字段命名遵循 MinerU 的 content-list 约定（`type`、`page_idx`、`bbox`、`text_level`）。
/// 核心流程只读取这些数据，从不修改。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_items: Vec<String>,
    #[serde(rename = "page_idx", default)]
    pub page_index: usize,
    #[serde(rename = "bbox", default)]
    pub bounding_box: BoundingBox,
    #[serde(rename = "text_level", default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    // 旁路通道字段：表格、图片、公式
    #[serde(default, alias = "table_body", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, alias = "img_path", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    #[serde(
        default,
        alias = "table_caption",
        alias = "image_caption",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub caption: Vec<String>,
}

impl RawBlock {
    /// 创建指定类型和文本的块（页码 0，空边界框）
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn at(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.hierarchy_level = Some(level);
        self
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    /// 提取块文本
    ///
    /// 依次尝试 `text`、`content`，最后以换行拼接 `list_items`。
    /// 全部为空时返回空字符串。
    pub fn extract_text(&self) -> String {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            return text.to_string();
        }
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            return content.to_string();
        }
        self.list_items.join("\n")
    }

    /// 是否为一级标题块
    pub fn is_title_level(&self) -> bool {
        self.hierarchy_level == Some(1)
    }

    pub fn region(&self) -> Region {
        Region::new(self.bounding_box, self.page_index)
    }
}

/// 接受单个字符串或字符串数组
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Null => Vec::new(),
    })
}

/// 逻辑段落
///
/// 不变量：`regions` 永不为空，主边界框与页码始终来自第一个区域。
/// 段落创建后不可变，翻译通过 [`Paragraph::with_text`] 生成新实例。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ParagraphRecord", try_from = "ParagraphRecord")]
pub struct Paragraph {
    text: String,
    regions: Vec<Region>,
}

impl Paragraph {
    /// 创建单区域段落
    pub fn new(text: impl Into<String>, region: Region) -> Self {
        Self {
            text: text.into(),
            regions: vec![region],
        }
    }

    /// 从区域列表创建段落，区域为空时返回 `None`
    pub fn from_regions(text: impl Into<String>, regions: Vec<Region>) -> Option<Self> {
        if regions.is_empty() {
            return None;
        }
        Some(Self {
            text: text.into(),
            regions,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page_index(&self) -> usize {
        self.regions[0].page_index
    }

    pub fn primary_bounding_box(&self) -> BoundingBox {
        self.regions[0].bounding_box
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// 替换文本，保留页码和全部区域
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            regions: self.regions.clone(),
        }
    }
}

/// 段落的序列化形式，额外输出主边界框和页码供单框消费者使用
#[derive(Serialize, Deserialize)]
struct ParagraphRecord {
    text: String,
    page: usize,
    bbox: BoundingBox,
    regions: Vec<Region>,
}

impl From<Paragraph> for ParagraphRecord {
    fn from(paragraph: Paragraph) -> Self {
        Self {
            page: paragraph.page_index(),
            bbox: paragraph.primary_bounding_box(),
            text: paragraph.text,
            regions: paragraph.regions,
        }
    }
}

impl TryFrom<ParagraphRecord> for Paragraph {
    type Error = String;

    fn try_from(record: ParagraphRecord) -> Result<Self, Self::Error> {
        let regions = if record.regions.is_empty() {
            vec![Region::new(record.bbox, record.page)]
        } else {
            record.regions
        };
        Paragraph::from_regions(record.text, regions)
            .ok_or_else(|| "paragraph must own at least one region".to_string())
    }
}

/// 表格（原样透传）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub html: String,
    pub caption: Option<String>,
    pub page_index: usize,
}

/// 图片（原样透传）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub path: String,
    pub caption: Option<String>,
    pub page_index: usize,
}

/// 解析后的论文
///
/// 翻译只会替换段落文本，其余通道原样透传。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub figures: Vec<Figure>,
    #[serde(default)]
    pub equations: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<RawBlock>,
}

impl Document {
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    /// 复制旁路通道，段落替换为给定序列
    pub fn with_paragraphs(&self, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            tables: self.tables.clone(),
            figures: self.figures.clone(),
            equations: self.equations.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// 单个段落的翻译状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParagraphStatus {
    /// 不需要翻译，原文透传
    Skipped,
    /// 已翻译
    Translated,
    /// 逐段回退也失败，保留原文
    Failed { reason: String },
}

impl ParagraphStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ParagraphStatus::Failed { .. })
    }
}

/// 翻译结果：文档 + 与段落一一对应的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedDocument {
    pub document: Document,
    pub statuses: Vec<ParagraphStatus>,
}

impl TranslatedDocument {
    /// 未翻译的文档，所有段落标记为跳过
    pub fn untranslated(document: Document) -> Self {
        let statuses = vec![ParagraphStatus::Skipped; document.paragraphs.len()];
        Self { document, statuses }
    }

    /// 最终失败（保留原文）的段落索引
    pub fn failed_indices(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| status.is_failed())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.statuses.iter().any(ParagraphStatus::is_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_block_from_content_list_json() {
        let json = r#"{
            "type": "text",
            "text": "Deep networks are hard to train.",
            "bbox": [62, 120, 488, 260],
            "page_idx": 2
        }"#;
        let block: RawBlock = serde_json::from_str(json).unwrap();

        assert_eq!(block.kind, BlockKind::Text);
        assert_eq!(block.page_index, 2);
        assert_eq!(block.bounding_box, BoundingBox::new(62.0, 120.0, 488.0, 260.0));
        assert_eq!(block.hierarchy_level, None);
    }

    #[test]
    fn test_raw_block_defaults() {
        let block: RawBlock = serde_json::from_str(r#"{"text": "No metadata"}"#).unwrap();

        assert_eq!(block.page_index, 0);
        assert_eq!(block.bounding_box, BoundingBox::default());
        assert_eq!(block.kind, BlockKind::Other);
    }

    #[test]
    fn test_unknown_kind_maps_to_other() {
        let block: RawBlock = serde_json::from_str(r#"{"type": "interline_ruler"}"#).unwrap();
        assert_eq!(block.kind, BlockKind::Other);
    }

    #[test]
    fn test_table_side_channel_aliases() {
        let json = r#"{
            "type": "table",
            "table_body": "<table><tr><td>1</td></tr></table>",
            "table_caption": ["Table 1: Results"],
            "page_idx": 4
        }"#;
        let block: RawBlock = serde_json::from_str(json).unwrap();

        assert_eq!(block.kind, BlockKind::Table);
        assert_eq!(block.html.as_deref(), Some("<table><tr><td>1</td></tr></table>"));
        assert_eq!(block.caption, vec!["Table 1: Results".to_string()]);
    }

    #[test]
    fn test_extract_text_priority() {
        let mut block = RawBlock {
            text: Some("Primary text".to_string()),
            list_items: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        assert_eq!(block.extract_text(), "Primary text");

        block.text = Some(String::new());
        block.content = Some("Fallback content".to_string());
        assert_eq!(block.extract_text(), "Fallback content");

        block.content = None;
        assert_eq!(block.extract_text(), "a\nb");

        block.list_items.clear();
        assert_eq!(block.extract_text(), "");
    }

    #[test]
    fn test_paragraph_primary_box_follows_first_region() {
        let first = Region::new(BoundingBox::new(10.0, 20.0, 300.0, 400.0), 1);
        let second = Region::new(BoundingBox::new(510.0, 20.0, 900.0, 120.0), 1);
        let paragraph = Paragraph::from_regions("merged", vec![first, second]).unwrap();

        assert_eq!(paragraph.page_index(), 1);
        assert_eq!(paragraph.primary_bounding_box(), first.bounding_box);
        assert_eq!(paragraph.regions().len(), 2);
        assert!(Paragraph::from_regions("empty", Vec::new()).is_none());
    }

    #[test]
    fn test_with_text_preserves_position() {
        let region = Region::new(BoundingBox::new(1.0, 2.0, 3.0, 4.0), 7);
        let original = Paragraph::new("hello", region);
        let translated = original.with_text("안녕하세요");

        assert_eq!(translated.text(), "안녕하세요");
        assert_eq!(translated.regions(), original.regions());
        assert_eq!(original.text(), "hello");
    }

    #[test]
    fn test_paragraph_serializes_primary_box() {
        let region = Region::new(BoundingBox::new(1.0, 2.0, 3.0, 4.0), 3);
        let paragraph = Paragraph::new("text", region);
        let value = serde_json::to_value(&paragraph).unwrap();

        assert_eq!(value["page"], 3);
        assert_eq!(value["bbox"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(value["regions"][0]["page"], 3);

        let back: Paragraph = serde_json::from_value(value).unwrap();
        assert_eq!(back, paragraph);
    }

    #[test]
    fn test_translated_document_failed_indices() {
        let result = TranslatedDocument {
            document: Document::default(),
            statuses: vec![
                ParagraphStatus::Translated,
                ParagraphStatus::Failed {
                    reason: "timeout".to_string(),
                },
                ParagraphStatus::Skipped,
            ],
        };

        assert_eq!(result.failed_indices(), vec![1]);
        assert!(!result.is_complete());
    }
}
