//! 翻译提示词
//!
//! 批量请求用固定分隔符拼接段落，要求模型原样保留分隔符并返回相同段数；
//! 单段请求不含分隔符规则。

/// 段落分隔符，不会出现在正常正文或公式中
pub const SEPARATOR: &str = "---PARAGRAPH_SEPARATOR---";

const COMMON_RULES: &str = "\
1. For important technical terms, append the original English term in parentheses on its first occurrence. Example: '강화 학습(Reinforcement Learning)'
2. NEVER modify LaTeX equations (anything between $...$, $$...$$, \\(...\\), \\[...\\], or \\begin{...}...\\end{...}). Output them exactly as they appear in the source.
3. Maintain a natural, formal academic writing style appropriate for published papers.
4. Output ONLY the translated text. Do not include any commentary, notes, or explanations.
";

fn header(target_lang: &str) -> String {
    format!(
        "You are an expert academic translator. Translate the following academic text to {}.\n\n## Rules\n",
        target_lang
    )
}

/// 批量翻译系统提示词
pub fn batch_system_prompt(target_lang: &str) -> String {
    format!(
        "{}{}5. Preserve the separator '{}' exactly as-is between paragraphs. The number of separated segments in your output MUST equal the number in the input.\n",
        header(target_lang),
        COMMON_RULES,
        SEPARATOR
    )
}

/// 单段翻译系统提示词
pub fn single_system_prompt(target_lang: &str) -> String {
    format!("{}{}", header(target_lang), COMMON_RULES)
}

/// 用分隔符拼接批次文本
pub fn join_batch<S: AsRef<str>>(texts: &[S]) -> String {
    let separator = format!("\n{}\n", SEPARATOR);
    texts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&separator)
}

/// 按分隔符拆分响应，每段去除首尾空白
pub fn split_response(response: &str) -> Vec<String> {
    response
        .split(SEPARATOR)
        .map(|segment| segment.trim().to_string())
        .collect()
}
