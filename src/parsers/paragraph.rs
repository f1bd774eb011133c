//! 段落重建器
//!
//! 布局引擎经常把一个逻辑段落拆成跨栏、跨页的多个文本块。
//! 本模块按阅读顺序扫描原始块，利用位置和词法启发式把碎片合并回段落，
//! 同时保留每个碎片的区域信息，供并排查看器高亮。
//!
//! ## 处理流程
//! 1. **正文过滤**: 只保留 text / title / list 块，去掉参考文献条目和致谢脚注
//! 2. **去除前置内容**: 删除第一、第二个一级标题之间的块（以 "abstract" 开头的除外）
//! 3. **截断参考文献**: 丢弃 REFERENCES / BIBLIOGRAPHY 一级标题及其后所有块
//! 4. **顺序合并**: 单遍状态机，逐块决定追加到当前段落还是开启新段落
//!
//! ## 合并判定（按优先级）
//! - 任一侧为一级标题：不合并
//! - 任一侧为列表：不合并
//! - 当前缓冲为空：不合并
//! - 同页、水平起点差超过阈值且下一块明显向上跳：判定为换栏或图注，不合并
//! - 下一块以小写字母开头：视为句子延续，合并
//! - 当前缓冲以 `. ! ? : ;` 结尾：句子完整，不合并
//! - 其他情况：默认合并（以单个空格连接）

use crate::document::{Paragraph, RawBlock, Region};
use crate::parsers::classifier::ContentClassifier;
use crate::parsers::latex::LatexSpanNormalizer;

/// 参考文献标题
const REFERENCE_HEADINGS: &[&str] = &["REFERENCES", "BIBLIOGRAPHY"];

/// 视为句子结束的字符
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', ':', ';'];

/// 重建器配置
///
/// 换栏阈值是针对 0-1000 归一化坐标的经验值，换用其他布局引擎时需要调整。
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructorConfig {
    /// 水平起点差阈值
    pub column_jump_x: f64,
    /// 向上跳跃阈值
    pub column_jump_y: f64,
    /// 是否去除标题与第一节之间的前置内容
    pub strip_front_matter: bool,
    /// 是否在参考文献标题处截断
    pub truncate_at_references: bool,
}

impl Default for ReconstructorConfig {
    fn default() -> Self {
        Self {
            column_jump_x: 100.0,
            column_jump_y: 100.0,
            strip_front_matter: true,
            truncate_at_references: true,
        }
    }
}

/// 规范化后的正文块
#[derive(Debug)]
struct BodyBlock<'a> {
    block: &'a RawBlock,
    text: String,
}

impl BodyBlock<'_> {
    fn is_title_level(&self) -> bool {
        self.block.is_title_level()
    }
}

/// 合并状态机的当前缓冲
struct ParagraphBuffer<'a> {
    text: String,
    regions: Vec<Region>,
    last: &'a BodyBlock<'a>,
}

impl<'a> ParagraphBuffer<'a> {
    fn start(block: &'a BodyBlock<'a>) -> Self {
        Self {
            text: block.text.clone(),
            regions: vec![block.block.region()],
            last: block,
        }
    }

    fn absorb(&mut self, block: &'a BodyBlock<'a>) {
        self.text.push(' ');
        self.text.push_str(&block.text);
        self.regions.push(block.block.region());
        self.last = block;
    }

    fn finish(self) -> Option<Paragraph> {
        if self.text.trim().is_empty() {
            return None;
        }
        Paragraph::from_regions(self.text, self.regions)
    }
}

/// 段落重建器
#[derive(Debug, Clone, Default)]
pub struct ParagraphReconstructor {
    config: ReconstructorConfig,
    classifier: ContentClassifier,
    normalizer: LatexSpanNormalizer,
}

impl ParagraphReconstructor {
    pub fn new(config: ReconstructorConfig) -> Self {
        Self {
            config,
            classifier: ContentClassifier::new(),
            normalizer: LatexSpanNormalizer::new(),
        }
    }

    pub fn config(&self) -> &ReconstructorConfig {
        &self.config
    }

    /// 把有序的原始块序列重建为有序段落序列
    ///
    /// 输出顺序与每个段落第一个贡献块在过滤后输入中的顺序一致。
    pub fn reconstruct(&self, blocks: &[RawBlock]) -> Vec<Paragraph> {
        let body = self.filter_body(blocks);
        let filtered = body.len();

        let body = if self.config.strip_front_matter {
            strip_front_matter(body)
        } else {
            body
        };
        let body = if self.config.truncate_at_references {
            truncate_at_references(body)
        } else {
            body
        };

        let paragraphs = self.merge(&body);
        tracing::debug!(
            "段落重建: 输入 {} 块，正文 {} 块，保留 {} 块，输出 {} 段",
            blocks.len(),
            filtered,
            body.len(),
            paragraphs.len()
        );
        paragraphs
    }

    /// 步骤 1：正文过滤 + LaTeX 规范化
    fn filter_body<'a>(&self, blocks: &'a [RawBlock]) -> Vec<BodyBlock<'a>> {
        blocks
            .iter()
            .filter(|block| self.classifier.is_body_text(block))
            .filter_map(|block| {
                let text = self.normalizer.normalize(&block.extract_text());
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                if self.classifier.is_acknowledgment(text) {
                    tracing::debug!("跳过致谢段落: {}", preview(text));
                    return None;
                }
                Some(BodyBlock {
                    block,
                    text: text.to_string(),
                })
            })
            .collect()
    }

    /// 步骤 4：顺序合并
    fn merge<'a>(&self, body: &'a [BodyBlock<'a>]) -> Vec<Paragraph> {
        let mut paragraphs = Vec::new();
        let mut blocks = body.iter();

        let Some(first) = blocks.next() else {
            return paragraphs;
        };
        let mut current = ParagraphBuffer::start(first);

        for next in blocks {
            if self.should_merge(&current, next) {
                current.absorb(next);
            } else {
                paragraphs.extend(current.finish());
                current = ParagraphBuffer::start(next);
            }
        }
        paragraphs.extend(current.finish());

        paragraphs
    }

    fn should_merge(&self, current: &ParagraphBuffer<'_>, next: &BodyBlock<'_>) -> bool {
        let last = current.last;

        if last.is_title_level() || next.is_title_level() {
            return false;
        }

        if self.classifier.is_list(last.block) || self.classifier.is_list(next.block) {
            return false;
        }

        let buffer = current.text.trim();
        if buffer.is_empty() {
            return false;
        }

        if self.is_column_break(last.block, next.block) {
            return false;
        }

        if next
            .text
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_lowercase)
        {
            return true;
        }

        if buffer.ends_with(SENTENCE_TERMINATORS) {
            return false;
        }

        true
    }

    /// 同页、水平起点相差较大且阅读顺序向上跳
    fn is_column_break(&self, current: &RawBlock, next: &RawBlock) -> bool {
        if current.page_index != next.page_index {
            return false;
        }
        let dx = (next.bounding_box.x_min - current.bounding_box.x_min).abs();
        let rise = current.bounding_box.y_min - next.bounding_box.y_min;
        dx > self.config.column_jump_x && rise > self.config.column_jump_y
    }
}

/// 步骤 2：删除第一、第二个一级标题之间的块，保留摘要
fn strip_front_matter(body: Vec<BodyBlock<'_>>) -> Vec<BodyBlock<'_>> {
    let titles: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, block)| block.is_title_level())
        .map(|(index, _)| index)
        .take(2)
        .collect();

    let [first, second] = titles[..] else {
        return body;
    };

    let before = body.len();
    let kept: Vec<_> = body
        .into_iter()
        .enumerate()
        .filter(|(index, block)| {
            *index <= first || *index >= second || starts_with_abstract(&block.text)
        })
        .map(|(_, block)| block)
        .collect();

    if kept.len() < before {
        tracing::debug!("去除前置内容 {} 块", before - kept.len());
    }
    kept
}

fn starts_with_abstract(text: &str) -> bool {
    text.trim_start()
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("abstract"))
}

/// 步骤 3：在参考文献标题处截断
fn truncate_at_references(mut body: Vec<BodyBlock<'_>>) -> Vec<BodyBlock<'_>> {
    if let Some(position) = body
        .iter()
        .position(|block| block.is_title_level() && is_reference_heading(&block.text))
    {
        tracing::debug!("在参考文献标题处截断，丢弃 {} 块", body.len() - position);
        body.truncate(position);
    }
    body
}

fn is_reference_heading(text: &str) -> bool {
    let heading = text.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    REFERENCE_HEADINGS.contains(&heading.as_str())
}

fn preview(text: &str) -> String {
    text.chars().take(60).collect()
}
