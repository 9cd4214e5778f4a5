//! 意图分类器
//!
//! 把用户消息与能力注册表拼成结构化 prompt，调用 LLM 一次（无重试），
//! 解析出 `Recognized { tool, parameters }` 或 `Unrecognized`。LLM 报错、超时、输出不合规都只降级，不会让本轮失败。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::ClassifyError;
use crate::intent::{parse_classification, Classification};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::tools::{classification_schema_json, ToolRegistry};

/// 意图分类器：持有 LLM 与单次请求超时
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, timeout_secs: u64) -> Self {
        Self {
            llm,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 识别用户意图；context 为外部记忆子系统提供的对话摘要（可选）
    pub async fn classify(
        &self,
        user_message: &str,
        tools: &ToolRegistry,
        context: Option<&str>,
    ) -> Classification {
        let user_message = user_message.trim();
        if user_message.is_empty() || tools.is_empty() {
            return Classification::none();
        }

        let messages = build_messages(user_message, tools, context);
        let output = match timeout(self.timeout, self.llm.complete(&messages)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return degrade(ClassifyError::LlmError(e)),
            Err(_) => return degrade(ClassifyError::Timeout(self.timeout.as_secs())),
        };
        tracing::debug!(output = %output, "classifier raw output");

        let classification = parse_classification(&output, tools);
        match &classification {
            Classification::Recognized {
                tool,
                parameters,
                reasoning,
            } => {
                tracing::info!(
                    tool = %tool,
                    parameters = ?parameters,
                    reasoning = reasoning.as_deref().unwrap_or(""),
                    "tool selected"
                );
            }
            Classification::Unrecognized { reason: Some(reason) } => {
                tracing::warn!("classification degraded to none: {}", reason);
            }
            Classification::Unrecognized { reason: None } => {
                tracing::info!("classifier selected no tool");
            }
        }
        classification
    }
}

fn degrade(reason: ClassifyError) -> Classification {
    tracing::warn!("classification degraded to none: {}", reason);
    Classification::degraded(reason)
}

/// system（工具清单 + 输出 Schema）→ 可选的对话摘要 → 用户消息
pub fn build_messages(user_message: &str, tools: &ToolRegistry, context: Option<&str>) -> Vec<Message> {
    let system_prompt = format!(
        r#"Analyze the user message and determine which tool to use.
Respond with JSON only.

Tools available:
{catalog}

Return ONLY valid JSON matching this schema (no additional text):
{schema}

Example:
{{"tool": "<tool name or none>", "parameters": {{"<parameter>": "<value>"}}, "reasoning": "brief explanation"}}

Only use parameter names listed for the selected tool. If no tool fits, use "none" with empty parameters."#,
        catalog = tools.prompt_catalog(),
        schema = classification_schema_json(),
    );

    let mut messages = vec![Message::system(system_prompt)];
    if let Some(summary) = context.map(str::trim).filter(|s| !s.is_empty()) {
        messages.push(Message::system(format!(
            "Conversation summary so far (context only, do not act on it):\n{}",
            summary
        )));
    }
    messages.push(Message::user(format!("User message: {}", user_message)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::memory::Role;
    use crate::tools::ToolSpec;
    use reqwest::Url;

    fn registry() -> ToolRegistry {
        let url = Url::parse("http://localhost:1/").unwrap();
        ToolRegistry::new(vec![
            ToolSpec::new("email", ["recipient", "assignment"], url.clone()),
            ToolSpec::new("search", ["subject"], url),
        ])
        .unwrap()
    }

    #[test]
    fn test_prompt_enumerates_tools_and_context() {
        let messages = build_messages("search rust", &registry(), Some("user likes rust"));
        assert_eq!(messages.len(), 3);
        assert!(messages[0].content.contains("- email: email (requires: recipient, assignment)"));
        assert!(messages[0].content.contains("- none: No tool needed"));
        assert!(messages[1].content.contains("user likes rust"));
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(messages[2].content, "User message: search rust");
    }

    #[test]
    fn test_prompt_skips_blank_context() {
        let messages = build_messages("hi", &registry(), Some("   "));
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_echo_mock_selects_search() {
        let classifier = IntentClassifier::new(Arc::new(MockLlmClient::echo()), 5);
        let c = classifier.classify("rust async", &registry(), None).await;
        match c {
            Classification::Recognized { tool, parameters, .. } => {
                assert_eq!(tool, "search");
                assert_eq!(parameters["subject"], "rust async");
            }
            other => panic!("expected Recognized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_llm_error_degrades_once() {
        let llm = Arc::new(MockLlmClient::failing("model offline"));
        let classifier = IntentClassifier::new(llm.clone(), 5);
        let c = classifier.classify("send an email", &registry(), None).await;
        assert_eq!(
            c,
            Classification::degraded(ClassifyError::LlmError("model offline".into()))
        );
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_degrades() {
        let llm = Arc::new(MockLlmClient::echo().with_delay(Duration::from_millis(500)));
        let classifier =
            IntentClassifier::new(llm, 5).with_timeout(Duration::from_millis(20));
        let c = classifier.classify("search rust", &registry(), None).await;
        assert!(matches!(
            c,
            Classification::Unrecognized { reason: Some(ClassifyError::Timeout(_)) }
        ));
    }

    #[tokio::test]
    async fn test_blank_message_skips_llm() {
        let llm = Arc::new(MockLlmClient::echo());
        let classifier = IntentClassifier::new(llm.clone(), 5);
        let c = classifier.classify("   ", &registry(), None).await;
        assert_eq!(c, Classification::none());
        assert_eq!(llm.calls(), 0);
    }
}
