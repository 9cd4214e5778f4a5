//! Courier - Rust 工具编排引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、单轮状态、回复合成、编排状态机
//! - **integrations**: HTTP 接口（feature `web`）
//! - **intent**: LLM 意图分类与回复解析
//! - **llm**: LLM 客户端抽象与实现（Ollama / OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 对话消息
//! - **observability**: 日志初始化
//! - **tools**: 能力注册表、Agent 派发器与派发结果

pub mod config;
pub mod core;
pub mod integrations;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod tools;

pub use crate::core::{Orchestrator, TurnPhase, TurnState};
pub use intent::Classification;
pub use tools::{DispatchOutcome, StatusClass, ToolRegistry, ToolSpec};
