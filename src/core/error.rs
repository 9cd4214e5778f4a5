//! 错误类型
//!
//! CourierError 只出现在启动阶段（配置、注册表构建）；单轮编排中的失败全部降级为回复文本，
//! ClassifyError / DispatchError 仅用于日志与状态记录。

use thiserror::Error;

/// 启动与注册表查找错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourierError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// "none" 表示不调用任何工具，不能作为工具名注册
    #[error("Reserved tool name: {0}")]
    ReservedToolName(String),

    #[error("Invalid tool name (surrounding whitespace): {0:?}")]
    InvalidToolName(String),

    #[error("Invalid endpoint for tool {tool}: {reason}")]
    InvalidEndpoint { tool: String, reason: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl From<config::ConfigError> for CourierError {
    fn from(e: config::ConfigError) -> Self {
        CourierError::ConfigError(e.to_string())
    }
}

/// 意图分类降级原因（ClassificationDegraded / UnknownTool），均回退为 Unrecognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Classifier timeout after {0}s")]
    Timeout(u64),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Unexpected classification shape: {0}")]
    SchemaMismatch(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// 失败派发的分类视图（Agent 拒绝 / Agent 故障 / 网络不可达）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Agent rejected the request ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("Agent failed ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Agent unreachable: {0}")]
    ConnectionFailure(String),
}
