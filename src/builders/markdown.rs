//! Markdown 构建器模块
//!
//! 把（翻译后的）文档渲染为 Markdown：正文段落之间空一行，
//! 之后是 `## Equations` 和 `## Tables` 附录。

use std::fs;
use std::path::Path;

use crate::document::{Document, TranslatedDocument};

#[derive(Debug, Clone)]
pub struct MarkdownBuilderConfig {
    /// 输出公式附录
    pub include_equations: bool,
    /// 输出表格附录
    pub include_tables: bool,
    /// 在保留原文的段落前加注释标记
    pub mark_failures: bool,
}

impl Default for MarkdownBuilderConfig {
    fn default() -> Self {
        Self {
            include_equations: true,
            include_tables: true,
            mark_failures: true,
        }
    }
}

pub struct MarkdownBuilder {
    config: MarkdownBuilderConfig,
}

impl MarkdownBuilder {
    pub fn new(config: MarkdownBuilderConfig) -> Self {
        Self { config }
    }

    /// 渲染文档
    pub fn build(&self, document: &Document) -> String {
        let mut lines: Vec<String> = Vec::new();

        for paragraph in &document.paragraphs {
            lines.push(paragraph.text().to_string());
            lines.push(String::new());
        }

        self.push_appendix(document, &mut lines);
        lines.join("\n")
    }

    /// 渲染翻译结果，失败段落按配置加标记
    pub fn build_translated(&self, translated: &TranslatedDocument) -> String {
        let mut lines: Vec<String> = Vec::new();

        for (paragraph, status) in translated
            .document
            .paragraphs
            .iter()
            .zip(&translated.statuses)
        {
            if self.config.mark_failures && status.is_failed() {
                lines.push("<!-- untranslated -->".to_string());
            }
            lines.push(paragraph.text().to_string());
            lines.push(String::new());
        }

        self.push_appendix(&translated.document, &mut lines);
        lines.join("\n")
    }

    fn push_appendix(&self, document: &Document, lines: &mut Vec<String>) {
        if self.config.include_equations && !document.equations.is_empty() {
            lines.push("---".to_string());
            lines.push("## Equations".to_string());
            for equation in &document.equations {
                lines.push(display_math(equation));
                lines.push(String::new());
            }
        }

        if self.config.include_tables && !document.tables.is_empty() {
            lines.push("---".to_string());
            lines.push("## Tables".to_string());
            for (i, table) in document.tables.iter().enumerate() {
                lines.push(format!("### Table {}", i + 1));
                if let Some(caption) = &table.caption {
                    lines.push(caption.clone());
                }
                lines.push(table.html.clone());
                lines.push(String::new());
            }
        }
    }

    /// 写入文件
    pub fn write_to(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }
}

impl Default for MarkdownBuilder {
    fn default() -> Self {
        Self::new(MarkdownBuilderConfig::default())
    }
}

/// 已带 `$$` 定界符的公式原样输出
fn display_math(equation: &str) -> String {
    let trimmed = equation.trim();
    if trimmed.starts_with("$$") && trimmed.ends_with("$$") && trimmed.len() >= 4 {
        trimmed.to_string()
    } else {
        format!("$${}$$", trimmed)
    }
}
