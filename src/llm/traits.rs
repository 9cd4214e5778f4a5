//! LLM 客户端抽象
//!
//! 分类器只依赖「给定 prompt 返回文本（期望为 JSON）」这一能力；OpenAI 兼容 / Ollama / DeepSeek / Mock 均实现 LlmClient。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait：单次非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;
}
