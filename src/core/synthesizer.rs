//! 回复合成
//!
//! 纯函数：按 StatusClass 穷举分支，把 DispatchOutcome 转成一段面向用户的文本。
//! Accepted 只展示 body.message，不回显 job id 等其他字段。

use serde_json::Value;

use crate::tools::{DispatchOutcome, StatusClass, ToolRegistry};

/// Accepted 分支的确认标记
pub const ACCEPTED_MARKER: &str = "request accepted";

/// 未识别到可执行请求时的回复开头
pub const NO_ACTION_MARKER: &str = "I couldn't identify an actionable request";

const GENERIC_ACCEPTED: &str = "Your request is being processed in the background.";
const GENERIC_ERROR: &str = "The agent did not provide error details.";

/// tool_name 为回复中使用的称呼（通常是 ToolSpec::display_name）
pub fn synthesize(tool_name: &str, outcome: &DispatchOutcome) -> String {
    match outcome.status_class {
        StatusClass::Success => format!(
            "✓ {} completed successfully!\n\n{}",
            tool_name,
            render_success_body(outcome)
        ),
        StatusClass::Accepted => format!(
            "✓ {} {}!\n\n{}\n\nIt is being processed independently; results will be delivered separately.",
            tool_name,
            ACCEPTED_MARKER,
            outcome.body_str("message").unwrap_or(GENERIC_ACCEPTED)
        ),
        StatusClass::ClientError => format!(
            "✗ {} was rejected (Status: {})\n\nError: {}",
            tool_name,
            outcome.status_code.unwrap_or_default(),
            outcome.error_text().unwrap_or_else(|| fallback_error(outcome))
        ),
        StatusClass::ServerError => format!(
            "✗ {} failed (Status: {})\n\nError: {}",
            tool_name,
            outcome.status_code.unwrap_or_default(),
            outcome.error_text().unwrap_or_else(|| fallback_error(outcome))
        ),
        StatusClass::ConnectionFailure => format!(
            "✗ {} agent is unreachable (Status: none)\n\nError: {}",
            tool_name,
            outcome
                .error_detail
                .as_deref()
                .unwrap_or("No response from agent")
        ),
    }
}

/// 分类为 none 时的回复：列出已注册工具的用法提示
pub fn no_action(tools: &ToolRegistry) -> String {
    let mut message = format!("{} for your request.", NO_ACTION_MARKER);
    if !tools.is_empty() {
        message.push_str(" Available tools:");
        for tool in tools.list_tools() {
            let hint = tool.description.as_deref().unwrap_or(tool.display_name());
            message.push_str(&format!("\n- {}: {}", tool.name, hint));
        }
    }
    message
}

/// result 字符串优先，其次 results，否则整个 body 的 pretty JSON
fn render_success_body(outcome: &DispatchOutcome) -> String {
    if let Some(result) = outcome.body_str("result") {
        return format!("Result: {}", result);
    }
    let Some(body) = outcome.body.as_ref() else {
        return "The agent returned no details.".to_string();
    };
    let value = body
        .get("results")
        .cloned()
        .unwrap_or_else(|| Value::Object(body.clone()));
    let rendered = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    format!("Details:\n{}", rendered)
}

fn fallback_error(outcome: &DispatchOutcome) -> String {
    outcome
        .error_detail
        .clone()
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}
