//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 批次处理相关
    pub const DEFAULT_BATCH_SIZE: usize = 25;
    pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 3;
    pub const MAX_CONCURRENT_REQUESTS: usize = 64;
    /// 初次请求 + 一次整批重试
    pub const DEFAULT_MAX_BATCH_ATTEMPTS: usize = 2;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 0;
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    // 文本过滤相关
    pub const SHORT_TEXT_MAX_WORDS: usize = 3;

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_TARGET_LANG: &str = "ko";

    // 段落重建
    pub const DEFAULT_COLUMN_JUMP_X: f64 = 100.0;
    pub const DEFAULT_COLUMN_JUMP_Y: f64 = 100.0;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "paper-translator.toml",
        "config.toml",
        ".paper-translator.toml",
        "~/.config/paper-translator/config.toml",
        "~/.config/paper-translator/config.json",
    ];
}
