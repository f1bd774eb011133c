//! 布局引擎接口
//!
//! 核心流程只依赖"按阅读顺序产出原始块，或报告文档不存在/解析失败"这一约定。
//! 这里提供两种来源：
//! - [`ContentListSource`]: 读取已有的 content-list JSON 文件
//! - [`MineruSource`]: 调用外部 `mineru` 进程解析 PDF，再读取其产出的 content-list

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{PaperError, PaperResult};
use crate::document::RawBlock;

/// content-list 文件名后缀
pub const CONTENT_LIST_SUFFIX: &str = "_content_list.json";

/// 原始块来源
#[async_trait]
pub trait LayoutSource: Send + Sync {
    /// 按阅读顺序加载原始块
    async fn load_blocks(&self) -> PaperResult<Vec<RawBlock>>;

    /// 来源描述，用于日志
    fn describe(&self) -> String;
}

/// 从 content-list JSON 文件读取原始块
#[derive(Debug, Clone)]
pub struct ContentListSource {
    path: PathBuf,
}

impl ContentListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LayoutSource for ContentListSource {
    async fn load_blocks(&self) -> PaperResult<Vec<RawBlock>> {
        if !self.path.exists() {
            return Err(PaperError::DocumentNotFound(self.path.clone()));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let blocks: Vec<RawBlock> = serde_json::from_str(&content).map_err(|e| {
            PaperError::ParseFailure(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::info!("已加载 {} 个布局块: {}", blocks.len(), self.path.display());
        Ok(blocks)
    }

    fn describe(&self) -> String {
        format!("content-list {}", self.path.display())
    }
}

/// 调用外部 MinerU 进程解析 PDF
#[derive(Debug, Clone)]
pub struct MineruSource {
    pdf: PathBuf,
    output_dir: PathBuf,
    binary: String,
    backend: Option<String>,
}

impl MineruSource {
    pub fn new(pdf: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            pdf: pdf.into(),
            output_dir: output_dir.into(),
            binary: "mineru".to_string(),
            backend: None,
        }
    }

    /// 指定可执行文件
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// 指定解析后端（例如 `pipeline`）
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-p")
            .arg(&self.pdf)
            .arg("-o")
            .arg(&self.output_dir);
        if let Some(backend) = &self.backend {
            command.arg("-b").arg(backend);
        }
        command
    }
}

#[async_trait]
impl LayoutSource for MineruSource {
    async fn load_blocks(&self) -> PaperResult<Vec<RawBlock>> {
        if !self.pdf.exists() {
            return Err(PaperError::DocumentNotFound(self.pdf.clone()));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;

        tracing::info!("运行布局引擎: {} {}", self.binary, self.pdf.display());
        let output = self.command().output().await.map_err(|e| {
            PaperError::LayoutEngine(format!("无法启动 {}: {}", self.binary, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(5)..].join("\n");
            return Err(PaperError::LayoutEngine(format!(
                "{} 退出状态 {}: {}",
                self.binary, output.status, tail
            )));
        }

        let stem = self
            .pdf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_list = find_content_list(&self.output_dir, &stem).await?;
        ContentListSource::new(content_list).load_blocks().await
    }

    fn describe(&self) -> String {
        format!("{} {}", self.binary, self.pdf.display())
    }
}

/// 在输出目录中查找 `<stem>_content_list.json`
pub async fn find_content_list(root: &Path, stem: &str) -> PaperResult<PathBuf> {
    let wanted = format!("{}{}", stem, CONTENT_LIST_SUFFIX);
    let mut pending = vec![root.to_path_buf()];
    let mut fallback = None;

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == wanted {
                return Ok(path);
            }
            if fallback.is_none() && name.ends_with(CONTENT_LIST_SUFFIX) {
                fallback = Some(path);
            }
        }
    }

    fallback.ok_or_else(|| {
        PaperError::ParseFailure(format!(
            "{} 中没有找到 {}",
            root.display(),
            wanted
        ))
    })
}
