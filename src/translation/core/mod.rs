//! 翻译系统核心模块
//!
//! ## 架构设计
//!
//! - **服务层** (`service.rs`): 组装配置、提供方和引擎
//! - **引擎层** (`engine.rs`): 批次分发、对齐校验、重试与逐段回退
//! - **提供方** (`provider.rs`): `complete(system, user)` 接口及 HTTP 实现
//! - **提示词** (`prompts.rs`): 分隔符与系统提示词
//!
//! ## 模块依赖关系
//!
//! ```text
//! TranslationService (service.rs)
//!     ├── TranslationConfig (config/manager.rs)
//!     ├── OpenAiProvider (provider.rs)
//!     └── BatchTranslationEngine (engine.rs)
//!             ├── TranslationEligibilityFilter (pipeline/filters.rs)
//!             ├── create_batches (pipeline/batch.rs)
//!             └── prompts (prompts.rs)
//! ```

pub mod engine;
pub mod prompts;
pub mod provider;
pub mod service;

pub use engine::{BatchTranslationEngine, EngineConfig, EngineStats, ProgressCallback};
pub use provider::{CompletionProvider, OpenAiProvider};
pub use service::TranslationService;
