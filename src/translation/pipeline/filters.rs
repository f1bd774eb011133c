//! 文本过滤器模块
//!
//! 判断段落是否需要翻译。被跳过的段落原样写回输出，不计入翻译请求。
//!
//! 跳过条件（满足任一即跳过）：
//! - 空文本或仅包含空白
//! - 整段是单个数学片段：`$...$`、`$$...$$`、`\(...\)`、`\[...\]`、
//!   `\begin{X}...\end{X}`
//! - 不超过 3 个词，且没有任何词包含连续 2 个以上的字母（页码、编号、孤立符号）

use std::sync::OnceLock;

use regex::Regex;

use crate::translation::config::constants;

/// 正则表达式缓存
struct Patterns {
    pure_math: Regex,
    alphabetic_word: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        pure_math: Regex::new(
            r"^(?:\$\$[^$]+\$\$|\$[^$]+\$|\\\((?s:.)+?\\\)|\\\[(?s:.)+?\\\]|\\begin\{[^}]+\}(?s:.)+?\\end\{[^}]+\})$",
        )
        .expect("pure math pattern"),
        alphabetic_word: Regex::new(r"[a-zA-Z]{2,}").expect("alphabetic word pattern"),
    })
}

/// 翻译资格过滤器
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationEligibilityFilter;

impl TranslationEligibilityFilter {
    pub fn new() -> Self {
        Self
    }

    /// 判断文本是否应跳过翻译
    pub fn should_skip(&self, text: &str) -> bool {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return true;
        }

        if self.is_pure_math(trimmed) {
            return true;
        }

        self.is_short_non_word(trimmed)
    }

    /// 整段是否为单个数学片段
    pub fn is_pure_math(&self, trimmed: &str) -> bool {
        patterns().pure_math.is_match(trimmed)
    }

    fn is_short_non_word(&self, trimmed: &str) -> bool {
        let mut words = trimmed.split_whitespace();
        let short = words.clone().count() <= constants::SHORT_TEXT_MAX_WORDS;
        short && !words.any(|word| patterns().alphabetic_word.is_match(word))
    }
}

/// 便利函数
pub fn should_skip(text: &str) -> bool {
    TranslationEligibilityFilter.should_skip(text)
}
