//! Mock LLM 客户端（用于测试与离线运行，无需 API）
//!
//! 默认取最后一条 User 消息，回显为 search 工具的分类 JSON，便于本地跑通整轮编排。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

#[derive(Debug, Clone)]
enum MockReply {
    /// {"tool": "search", "parameters": {"subject": <用户消息>}}
    EchoSearch,
    Fixed(String),
    Fail(String),
}

/// Mock 客户端：回显 / 固定回复 / 固定失败，可附加延迟；记录调用次数
#[derive(Debug)]
pub struct MockLlmClient {
    reply: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self {
            reply: MockReply::EchoSearch,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockLlmClient {
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn fixed(reply: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fixed(reply.into()),
            ..Self::default()
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fail(error.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            MockReply::Fixed(s) => Ok(s.clone()),
            MockReply::Fail(e) => Err(e.clone()),
            MockReply::EchoSearch => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| matches!(m.role, Role::User))
                    .map(|m| m.content.as_str())
                    .unwrap_or("(no input)");
                let subject = last_user.strip_prefix("User message: ").unwrap_or(last_user);
                Ok(serde_json::json!({
                    "tool": "search",
                    "parameters": { "subject": subject },
                    "reasoning": "mock echo"
                })
                .to_string())
            }
        }
    }
}
