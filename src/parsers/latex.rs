//! LaTeX 片段空白规范化
//!
//! 布局/OCR 引擎经常在公式内部插入多余空格（数字被拆开、命令与花括号分离等）。
//! 本模块在内容进入翻译阶段之前修复这些空白，使公式在翻译前后可以逐字节比较。
//!
//! ## 规则（按顺序执行）
//! 1. 删除格式命令名与花括号之间的空白
//! 2. 收紧其余花括号内侧的空白
//! 3. 删除 `_` / `^` 与紧随花括号周围的空白
//! 4. 格式命令体内：删除单词字符之间的空白，规范连字符两侧空白
//! 5. 行内公式 `$...$` 内：合并数字间空白（直到稳定）、小数点、括号内侧、数字与反斜杠命令之间
//! 6. 删除 `$` / `$$` 定界符内侧的空白
//!
//! 公式片段按 `$$...$$` 优先、`$...$` 其次切分，行间公式只做规则 6。
//!
//! 规则只作用于可识别的 LaTeX 结构，普通文本原样保留。

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// 已知的格式命令
pub const FORMATTING_COMMANDS: &[&str] = &[
    "mathrm", "text", "mathbb", "mathbf", "mathit", "mathcal", "mathsf", "textbf", "textit",
    "textrm", "texttt",
];

struct Patterns {
    command_brace: Regex,
    brace_open: Regex,
    brace_close: Regex,
    subscript: Regex,
    superscript: Regex,
    command_body: Regex,
    hyphen: Regex,
    math_span: Regex,
    digit_gap: Regex,
    decimal_point: Regex,
    paren_open: Regex,
    paren_close: Regex,
    digit_command: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let commands = FORMATTING_COMMANDS.join("|");
        Patterns {
            command_brace: Regex::new(&format!(r"(\\(?:{}))\s*\{{\s*", commands))
                .expect("command brace pattern"),
            brace_open: Regex::new(r"\{\s+").expect("brace open pattern"),
            brace_close: Regex::new(r"\s+\}").expect("brace close pattern"),
            subscript: Regex::new(r"\s*_\s*\{").expect("subscript pattern"),
            superscript: Regex::new(r"\s*\^\s*\{").expect("superscript pattern"),
            command_body: Regex::new(&format!(r"(\\(?:{}))\{{([^}}]+)\}}", commands))
                .expect("command body pattern"),
            hyphen: Regex::new(r"\s*-\s*").expect("hyphen pattern"),
            math_span: Regex::new(r"\$\$([^$]+)\$\$|\$([^$]+)\$").expect("math span pattern"),
            digit_gap: Regex::new(r"(\d)\s+(\d)").expect("digit gap pattern"),
            decimal_point: Regex::new(r"(\d)\s*\.\s*(\d)").expect("decimal pattern"),
            paren_open: Regex::new(r"\(\s+").expect("paren open pattern"),
            paren_close: Regex::new(r"\s+\)").expect("paren close pattern"),
            digit_command: Regex::new(r"(\d)\s+(\\)").expect("digit command pattern"),
        }
    })
}

/// LaTeX 片段规范化器
///
/// 无状态，幂等：`normalize(normalize(x)) == normalize(x)`。
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexSpanNormalizer;

impl LatexSpanNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化文本中的 LaTeX 片段，空输入原样返回
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = fix_command_braces(text);
        let text = fix_brace_spacing(&text);
        let text = fix_script_markers(&text);
        let text = fix_command_bodies(&text);
        fix_inline_math(&text)
    }
}

/// 便捷函数
pub fn normalize(text: &str) -> String {
    LatexSpanNormalizer.normalize(text)
}

fn fix_command_braces(text: &str) -> String {
    patterns()
        .command_brace
        .replace_all(text, "${1}{")
        .into_owned()
}

fn fix_brace_spacing(text: &str) -> String {
    let p = patterns();
    let text = p.brace_open.replace_all(text, "{");
    p.brace_close.replace_all(&text, "}").into_owned()
}

fn fix_script_markers(text: &str) -> String {
    let p = patterns();
    let text = p.subscript.replace_all(text, "_{");
    p.superscript.replace_all(&text, "^{").into_owned()
}

fn fix_command_bodies(text: &str) -> String {
    let p = patterns();
    p.command_body
        .replace_all(text, |caps: &Captures| {
            let body = join_word_runs(&caps[2]);
            let body = p.hyphen.replace_all(&body, "-");
            format!("{}{{{}}}", &caps[1], body)
        })
        .into_owned()
}

/// 删除两侧都是单词字符的空白段，例如 `h e l l o` -> `hello`
fn join_word_runs(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_whitespace() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        let before = start.checked_sub(1).map(|j| chars[j]);
        let after = chars.get(i).copied();
        let between_words = matches!((before, after), (Some(b), Some(a)) if is_word_char(b) && is_word_char(a));
        if !between_words {
            out.extend(&chars[start..i]);
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 规则 5 与规则 6：只在公式片段内部生效，片段之间的文本原样保留
fn fix_inline_math(text: &str) -> String {
    patterns()
        .math_span
        .replace_all(text, |caps: &Captures| {
            if let Some(display) = caps.get(1) {
                return format!("$${}$$", trim_math(display.as_str()));
            }
            format!("${}$", trim_math(&fix_inline_content(&caps[2])))
        })
        .into_owned()
}

fn fix_inline_content(content: &str) -> String {
    let p = patterns();
    let mut content = content.to_string();

    loop {
        let next = p.digit_gap.replace_all(&content, "${1}${2}").into_owned();
        if next == content {
            break;
        }
        content = next;
    }

    let content = p.decimal_point.replace_all(&content, "${1}.${2}");
    let content = p.paren_open.replace_all(&content, "(");
    let content = p.paren_close.replace_all(&content, ")");
    p.digit_command.replace_all(&content, "${1}${2}").into_owned()
}

/// 全空白的片段保持原样
fn trim_math(content: &str) -> &str {
    match content.trim() {
        "" => content,
        trimmed => trimmed,
    }
}
