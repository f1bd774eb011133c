//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。所有变量以 `PAPER_` 为前缀，
//! 由配置管理器在配置文件之后应用，优先级高于配置文件、低于命令行参数。

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 只读取显式设置的值，忽略默认值；解析失败时记录警告并返回 `None`
    fn lookup() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAPER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;
    use crate::translation::constants::MAX_CONCURRENT_REQUESTS;

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "PAPER_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language code, e.g. ko, ja, zh-CN (default: ko)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid language code '{}'", value),
                });
            }
            Ok(lang.to_string())
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PAPER_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "OpenAI-compatible API base URL (default: https://api.openai.com/v1)";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// API 密钥，未设置时回退到 `OPENAI_API_KEY`
    pub struct ApiKey;
    impl ApiKey {
        pub const FALLBACK_NAME: &'static str = "OPENAI_API_KEY";
    }
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "PAPER_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key for the translation provider (falls back to OPENAI_API_KEY)";

        fn get() -> EnvResult<String> {
            env::var(Self::NAME)
                .or_else(|_| env::var(Self::FALLBACK_NAME))
                .map_err(|_| EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Neither PAPER_API_KEY nor OPENAI_API_KEY is set".to_string(),
                })
                .and_then(|value| Self::parse(&value))
        }

        fn lookup() -> Option<String> {
            Self::get().ok()
        }

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 模型名称
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "PAPER_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Chat model name (default: gpt-4o-mini)";

        fn parse(value: &str) -> EnvResult<String> {
            let model = value.trim();
            if model.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model name cannot be empty".to_string(),
                });
            }
            Ok(model.to_string())
        }
    }

    /// 批次大小
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "PAPER_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(25);
        const DESCRIPTION: &'static str = "Maximum paragraphs per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 500)
        }
    }

    /// 最大并发请求数
    pub struct MaxConcurrentRequests;
    impl EnvVar<usize> for MaxConcurrentRequests {
        const NAME: &'static str = "PAPER_MAX_CONCURRENT_REQUESTS";
        const DEFAULT: Option<usize> = Some(3);
        const DESCRIPTION: &'static str = "Maximum in-flight translation requests";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, MAX_CONCURRENT_REQUESTS)
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "PAPER_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Per-request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 3600)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// 整批尝试次数
    pub struct MaxBatchAttempts;
    impl EnvVar<usize> for MaxBatchAttempts {
        const NAME: &'static str = "PAPER_MAX_BATCH_ATTEMPTS";
        const DEFAULT: Option<usize> = Some(2);
        const DESCRIPTION: &'static str =
            "Whole-batch attempts before falling back to per-paragraph requests";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 10)
        }
    }

    /// 整批重试延迟
    pub struct RetryDelayMs;
    impl EnvVar<u64> for RetryDelayMs {
        const NAME: &'static str = "PAPER_RETRY_DELAY_MS";
        const DEFAULT: Option<u64> = Some(0);
        const DESCRIPTION: &'static str = "Delay before retrying a batch, in milliseconds";

        fn parse(value: &str) -> EnvResult<u64> {
            value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of milliseconds".to_string(),
            })
        }
    }
}

/// 段落重建相关环境变量
pub mod reconstruction {
    use super::*;

    /// 换栏判定的水平阈值
    pub struct ColumnJumpX;
    impl EnvVar<f64> for ColumnJumpX {
        const NAME: &'static str = "PAPER_COLUMN_JUMP_X";
        const DEFAULT: Option<f64> = Some(100.0);
        const DESCRIPTION: &'static str = "Horizontal column-break threshold (0-1000 space)";

        fn parse(value: &str) -> EnvResult<f64> {
            parse_threshold(value, Self::NAME)
        }
    }

    /// 换栏判定的垂直阈值
    pub struct ColumnJumpY;
    impl EnvVar<f64> for ColumnJumpY {
        const NAME: &'static str = "PAPER_COLUMN_JUMP_Y";
        const DEFAULT: Option<f64> = Some(100.0);
        const DESCRIPTION: &'static str = "Vertical column-break threshold (0-1000 space)";

        fn parse(value: &str) -> EnvResult<f64> {
            parse_threshold(value, Self::NAME)
        }
    }

    /// 去除标题与第一节之间的前置内容
    pub struct StripFrontMatter;
    impl EnvVar<bool> for StripFrontMatter {
        const NAME: &'static str = "PAPER_STRIP_FRONT_MATTER";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Drop author/affiliation blocks between title and first section";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 在参考文献处截断
    pub struct TruncateAtReferences;
    impl EnvVar<bool> for TruncateAtReferences {
        const NAME: &'static str = "PAPER_TRUNCATE_AT_REFERENCES";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Discard everything from the REFERENCES heading onward";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 布局引擎相关环境变量
pub mod layout {
    use super::*;

    /// MinerU 可执行文件
    pub struct MineruBinary;
    impl EnvVar<String> for MineruBinary {
        const NAME: &'static str = "PAPER_MINERU_BIN";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("mineru".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Layout engine executable (default: mineru)";

        fn parse(value: &str) -> EnvResult<String> {
            let binary = value.trim();
            if binary.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Executable cannot be empty".to_string(),
                });
            }
            Ok(binary.to_string())
        }
    }

    /// MinerU 解析后端
    pub struct MineruBackend;
    impl EnvVar<String> for MineruBackend {
        const NAME: &'static str = "PAPER_MINERU_BACKEND";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Layout engine backend passed as -b, e.g. pipeline";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_threshold(value: &str, var_name: &str) -> EnvResult<f64> {
    let num: f64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number".to_string(),
    })?;

    if !(num > 0.0 && num <= 1000.0) {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} must be in (0, 1000]", num),
        });
    }

    Ok(num)
}

fn push_entry<T: fmt::Debug, V: EnvVar<T>>(docs: &mut String) {
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        V::NAME,
        V::DESCRIPTION,
        V::DEFAULT
    ));
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    push_entry::<String, core::LogLevel>(&mut docs);
    push_entry::<bool, core::NoColor>(&mut docs);

    docs.push_str("\n## Translation\n\n");
    push_entry::<String, translation::TargetLang>(&mut docs);
    push_entry::<String, translation::ApiUrl>(&mut docs);
    push_entry::<String, translation::ApiKey>(&mut docs);
    push_entry::<String, translation::Model>(&mut docs);
    push_entry::<usize, translation::BatchSize>(&mut docs);
    push_entry::<usize, translation::MaxConcurrentRequests>(&mut docs);
    push_entry::<Duration, translation::RequestTimeout>(&mut docs);
    push_entry::<usize, translation::MaxBatchAttempts>(&mut docs);
    push_entry::<u64, translation::RetryDelayMs>(&mut docs);

    docs.push_str("\n## Paragraph Reconstruction\n\n");
    push_entry::<f64, reconstruction::ColumnJumpX>(&mut docs);
    push_entry::<f64, reconstruction::ColumnJumpY>(&mut docs);
    push_entry::<bool, reconstruction::StripFrontMatter>(&mut docs);
    push_entry::<bool, reconstruction::TruncateAtReferences>(&mut docs);

    docs.push_str("\n## Layout Engine\n\n");
    push_entry::<String, layout::MineruBinary>(&mut docs);
    push_entry::<String, layout::MineruBackend>(&mut docs);

    docs
}
