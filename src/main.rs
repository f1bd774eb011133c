//! 命令行入口

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use paper_translator::builders::MarkdownBuilder;
use paper_translator::core::{
    format_output_path, layout_source_for, parse_paper, print_error_message, print_info_message,
};
use paper_translator::document::TranslatedDocument;
use paper_translator::env::{self, EnvVar};
use paper_translator::translation::{
    ConfigManager, ProgressCallback, TranslationConfig, TranslationService,
};

#[derive(Parser, Debug)]
#[command(
    name = "paper-translator",
    version,
    about = "Reconstruct paragraphs from a paper layout and translate them, keeping math intact."
)]
struct Cli {
    /// content-list JSON 或 PDF 文件
    #[arg(required_unless_present_any = ["env_docs", "init_config"])]
    input: Option<PathBuf>,

    /// JSON 输出路径，支持 %stem% 和 %extension%
    #[arg(short, long)]
    output: Option<String>,

    /// 目标语言
    #[arg(short, long)]
    lang: Option<String>,

    /// 同时导出 Markdown，不带路径时输出到输入文件旁
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    markdown: Option<String>,

    /// 只解析不翻译
    #[arg(long)]
    no_translate: bool,

    /// 每批段落数
    #[arg(long)]
    batch_size: Option<usize>,

    /// 同时在途的请求上限
    #[arg(long)]
    concurrency: Option<usize>,

    /// OpenAI 兼容的 API 地址
    #[arg(long)]
    api_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    model: Option<String>,

    /// 配置文件（TOML 或 JSON）
    #[arg(short, long)]
    config: Option<String>,

    /// 使用 MinerU 解析输入 PDF
    #[arg(long)]
    mineru: bool,

    /// MinerU 输出目录
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 打印环境变量说明后退出
    #[arg(long)]
    env_docs: bool,

    /// 生成示例配置文件后退出
    #[arg(long, value_name = "PATH")]
    init_config: Option<String>,
}

impl Cli {
    /// 命令行参数覆盖配置
    fn apply_overrides(&self, config: &mut TranslationConfig) {
        if let Some(lang) = &self.lang {
            config.target_lang = lang.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_requests = concurrency;
        }
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        env::core::LogLevel::get_or_default("info".to_string())
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(!env::core::NoColor::get_or_default(false))
        .init();
}

fn load_config(cli: &Cli) -> Result<TranslationConfig, String> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::new(),
    }
    .map_err(|e| e.to_string())?;

    let mut config = manager.into_config();
    cli.apply_overrides(&mut config);
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

async fn write_output(path: &Path, content: String) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.env_docs {
        print_info_message(&env::generate_env_docs());
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &cli.init_config {
        return match ConfigManager::generate_example_config(path) {
            Ok(()) => {
                print_info_message(&format!("已生成示例配置文件: {}", path));
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_error_message(&e.to_string());
                ExitCode::FAILURE
            }
        };
    }

    let Some(input) = cli.input.clone() else {
        print_error_message("缺少输入文件");
        return ExitCode::FAILURE;
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            print_error_message(&e);
            return ExitCode::FAILURE;
        }
    };

    let source = layout_source_for(&input, cli.mineru, cli.work_dir.as_deref());
    let document = match parse_paper(source.as_ref(), &config).await {
        Ok(document) => document,
        Err(e) => {
            print_error_message(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    print_info_message(&format!(
        "解析完成: {} 段落, {} 表格, {} 图片, {} 公式",
        document.paragraphs.len(),
        document.tables.len(),
        document.figures.len(),
        document.equations.len()
    ));

    let translated = if cli.no_translate {
        TranslatedDocument::untranslated(document)
    } else {
        let service = match TranslationService::new(config) {
            Ok(service) => service,
            Err(e) => {
                print_error_message(&e.to_string());
                return ExitCode::FAILURE;
            }
        };

        print_info_message(&format!("翻译中: {}", service.get_config().target_lang));
        let progress: ProgressCallback = Arc::new(|done, total| {
            eprintln!("翻译进度: {}/{}", done, total);
        });
        let translated = service.translate_document(&document, Some(progress)).await;

        let stats = service.get_stats();
        tracing::info!(
            "请求 {} 次，重试 {} 次，逐段回退 {} 段",
            stats.get_provider_calls(),
            stats.get_batch_retries(),
            stats.get_individual_fallbacks()
        );
        translated
    };

    let output_path = format_output_path(&input, cli.output.as_deref(), "json");
    let json = match serde_json::to_string_pretty(&translated) {
        Ok(json) => json,
        Err(e) => {
            print_error_message(&format!("序列化失败: {}", e));
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = write_output(&output_path, json).await {
        print_error_message(&format!("写入 {} 失败: {}", output_path.display(), e));
        return ExitCode::FAILURE;
    }
    print_info_message(&format!("已保存: {}", output_path.display()));

    if let Some(markdown) = &cli.markdown {
        let explicit = (!markdown.is_empty()).then_some(markdown.as_str());
        let markdown_path = format_output_path(&input, explicit, "md");
        let builder = MarkdownBuilder::default();
        if let Err(e) = builder.write_to(&markdown_path, &builder.build_translated(&translated)) {
            print_error_message(&format!("写入 {} 失败: {}", markdown_path.display(), e));
            return ExitCode::FAILURE;
        }
        print_info_message(&format!("已保存: {}", markdown_path.display()));
    }

    let failed = translated.failed_indices();
    if !failed.is_empty() {
        print_error_message(&format!(
            "警告: {} 个段落翻译失败，保留原文: {:?}",
            failed.len(),
            failed
        ));
    }

    ExitCode::SUCCESS
}
