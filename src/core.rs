//! 核心流程
//!
//! 致命错误类型和端到端入口：从布局来源加载原始块，重建段落，
//! 再交给翻译服务。输入错误立即返回，不产生部分输出。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::document::{Document, TranslatedDocument};
use crate::env::{layout as env_layout, EnvVar};
use crate::parsers::layout::CONTENT_LIST_SUFFIX;
use crate::parsers::{ContentListSource, DocumentParser, LayoutSource, MineruSource};
use crate::translation::{
    CompletionProvider, ProgressCallback, TranslationConfig, TranslationError, TranslationService,
};

/// 致命错误
#[derive(Error, Debug)]
pub enum PaperError {
    /// 源文档不存在
    #[error("文档不存在: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// 布局数据无法解析
    #[error("解析失败: {0}")]
    ParseFailure(String),

    /// 外部布局引擎失败
    #[error("布局引擎错误: {0}")]
    LayoutEngine(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 翻译服务无法创建（配置错误、缺少密钥等）
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type PaperResult<T> = Result<T, PaperError>;

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 根据输入文件选择布局来源
///
/// PDF 或显式要求时调用 MinerU，否则把输入当作 content-list JSON。
pub fn layout_source_for(
    input: &Path,
    use_mineru: bool,
    work_dir: Option<&Path>,
) -> Box<dyn LayoutSource> {
    let is_pdf = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if use_mineru || is_pdf {
        let output_dir = work_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("mineru"));
        let mut source = MineruSource::new(input, output_dir)
            .with_binary(env_layout::MineruBinary::get_or_default("mineru".to_string()));
        if let Some(backend) = env_layout::MineruBackend::lookup() {
            source = source.with_backend(backend);
        }
        Box::new(source)
    } else {
        Box::new(ContentListSource::new(input))
    }
}

/// 加载并解析论文
pub async fn parse_paper(
    source: &dyn LayoutSource,
    config: &TranslationConfig,
) -> PaperResult<Document> {
    let parser = DocumentParser::new(config.reconstructor_config());
    parser.parse_source(source).await
}

/// 加载、解析并翻译论文
///
/// # 参数
///
/// * `source` - 布局来源
/// * `config` - 翻译配置
/// * `provider` - 自定义提供方，`None` 时使用配置中的 OpenAI 兼容接口
/// * `on_batch_complete` - 可选的进度回调
///
/// # 返回值
///
/// 翻译结果；提供方错误不会出现在这里，而是体现为段落的失败状态
pub async fn translate_paper(
    source: &dyn LayoutSource,
    config: TranslationConfig,
    provider: Option<Arc<dyn CompletionProvider>>,
    on_batch_complete: Option<ProgressCallback>,
) -> PaperResult<TranslatedDocument> {
    let document = parse_paper(source, &config).await?;

    let service = match provider {
        Some(provider) => TranslationService::with_provider(config, provider)?,
        None => TranslationService::new(config)?,
    };

    Ok(service.translate_document(&document, on_batch_complete).await)
}

/// 计算输出路径
///
/// 显式路径中的 `%stem%` 和 `%extension%` 会被替换；未指定时在输入旁生成
/// `<stem>.translated.<extension>`，其中 `<stem>` 去掉了 content-list 后缀。
pub fn format_output_path(input: &Path, explicit: Option<&str>, extension: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(CONTENT_LIST_SUFFIX)
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let stem = match stem.trim_start_matches('.') {
        "" => "paper",
        stem => stem,
    };

    match explicit {
        Some(path) => PathBuf::from(
            path.replace("%stem%", stem)
                .replace("%extension%", extension),
        ),
        None => input.with_file_name(format!("{}.translated.{}", stem, extension)),
    }
}

/// 在 stderr 输出错误信息
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

/// 在 stdout 输出信息
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
