//! 内容分类器
//!
//! 按布局块类型把原始块分到正文、表格、图片、公式和元数据通道。
//!
//! 致谢/资助脚注通过句首主语 + 同句资助词汇的正则启发式识别。
//! 短块（不超过两句）检查每一句，长块只检查第一句，避免正文段落中的
//! 单个句子拖累整段。这是已知的精度限制：措辞不典型的致谢会漏判，
//! 以致谢句开头的正文段落也可能被误判。

use std::sync::OnceLock;

use regex::Regex;

use crate::document::{BlockKind, RawBlock};

/// 参考文献条目的子类型标记
pub const REFERENCE_SUB_TYPE: &str = "ref_text";

/// 不超过这个句数的块逐句检查致谢
const SHORT_BLOCK_SENTENCES: usize = 2;

fn acknowledgment_regex() -> &'static Regex {
    static ACK: OnceLock<Regex> = OnceLock::new();
    ACK.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:this\s+(?:work|research|study|project|paper)|the\s+authors?)\b[^.!?]*?\b(?:supported|funded|funding|grants?|sponsored|acknowledg\w*|fellowship|scholarship)\b",
        )
        .expect("acknowledgment pattern")
    })
}

fn sentence_break_regex() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence break pattern"))
}

/// 内容分类器
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentClassifier;

impl ContentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 正文块：text / title / list，且不是参考文献条目
    pub fn is_body_text(&self, block: &RawBlock) -> bool {
        matches!(block.kind, BlockKind::Text | BlockKind::Title | BlockKind::List)
            && block.sub_type.as_deref() != Some(REFERENCE_SUB_TYPE)
    }

    pub fn is_table(&self, block: &RawBlock) -> bool {
        block.kind == BlockKind::Table
    }

    pub fn is_figure(&self, block: &RawBlock) -> bool {
        block.kind == BlockKind::Image
    }

    pub fn is_equation(&self, block: &RawBlock) -> bool {
        block.kind == BlockKind::Equation
    }

    pub fn is_list(&self, block: &RawBlock) -> bool {
        block.kind == BlockKind::List
    }

    pub fn is_metadata(&self, block: &RawBlock) -> bool {
        matches!(
            block.kind,
            BlockKind::Header
                | BlockKind::Footer
                | BlockKind::PageNumber
                | BlockKind::AsideText
                | BlockKind::PageFootnote
                | BlockKind::Code
        )
    }

    pub fn is_footnote(&self, block: &RawBlock) -> bool {
        block.kind == BlockKind::PageFootnote
    }

    pub fn is_header_footer(&self, block: &RawBlock) -> bool {
        matches!(block.kind, BlockKind::Header | BlockKind::Footer)
    }

    /// 是否像致谢/资助说明
    pub fn is_acknowledgment(&self, text: &str) -> bool {
        let sentences: Vec<&str> = sentence_break_regex().split(text.trim()).collect();
        let checked = if sentences.len() <= SHORT_BLOCK_SENTENCES {
            sentences.len()
        } else {
            1
        };
        sentences
            .iter()
            .take(checked)
            .any(|sentence| acknowledgment_regex().is_match(sentence.trim_start()))
    }
}
