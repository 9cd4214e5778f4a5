//! Agent 派发器
//!
//! 对选中工具的端点发起一次 POST（JSON body），在请求级超时内等待确认；
//! 按状态码归类为 DispatchOutcome，网络层失败归为 ConnectionFailure。每次调用输出结构化审计日志（JSON）。
//! 不做重试：Agent 已确认后会自行重试慢步骤，重发确认请求可能造成重复副作用（如重复发信）。

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::{redirect, Client};
use serde_json::{Map, Value};

use crate::core::CourierError;
use crate::tools::{DispatchOutcome, ToolSpec};

/// 派发器：持有共享的 reqwest Client 与默认超时
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    timeout: Duration,
}

impl Dispatcher {
    /// 不跟随重定向：3xx 原样归为 ServerError，确保每次派发只发出一个 POST
    pub fn new(timeout_secs: u64) -> Result<Self, CourierError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| CourierError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, Duration::from_secs(timeout_secs)))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// 调用 Agent；返回值总是 DispatchOutcome，不会返回 Err
    pub async fn dispatch(
        &self,
        tool: &ToolSpec,
        parameters: &BTreeMap<String, String>,
    ) -> DispatchOutcome {
        let start = Instant::now();
        let payload = request_body(tool, parameters);
        let timeout = tool.timeout.unwrap_or(self.timeout);
        tracing::info!(tool = %tool.name, endpoint = %tool.endpoint, "dispatching to agent");

        let outcome = match self
            .client
            .post(tool.endpoint.clone())
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(text) => DispatchOutcome::from_response(status, parse_body(&text)),
                    Err(e) => {
                        tracing::warn!(tool = %tool.name, "failed to read agent response body: {}", e);
                        DispatchOutcome::from_response(status, None)
                            .with_error_detail(format!("Failed to read response body: {}", e))
                    }
                }
            }
            Err(e) => DispatchOutcome::connection_failure(describe_transport_error(
                tool, &e, timeout,
            )),
        };

        let audit = serde_json::json!({
            "event": "dispatch_audit",
            "tool": tool.name,
            "status_class": outcome.status_class.as_str(),
            "status_code": outcome.status_code,
            "duration_ms": start.elapsed().as_millis() as u64,
            "request_preview": preview(&Value::Object(payload)),
        });
        tracing::info!(audit = %audit.to_string(), "dispatch");

        if let Some(err) = outcome.as_error() {
            tracing::warn!(tool = %tool.name, "{}", err);
        }
        outcome
    }
}

/// 只发送该工具声明的参数；分类器遗漏的参数以空字符串转发，由 Agent 自行校验
fn request_body(tool: &ToolSpec, parameters: &BTreeMap<String, String>) -> Map<String, Value> {
    tool.parameter_names
        .iter()
        .map(|name| {
            let value = parameters.get(name).cloned().unwrap_or_default();
            (name.clone(), Value::String(value))
        })
        .collect()
}

/// JSON 对象原样保留；非对象或非 JSON 文本包装为 {"raw_response": ...}；空 body 为 None
fn parse_body(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) | Err(_) => {
            let mut map = Map::new();
            map.insert("raw_response".to_string(), Value::String(text.to_string()));
            Some(map)
        }
    }
}

fn describe_transport_error(tool: &ToolSpec, e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!(
            "{} agent request timed out after {}s",
            tool.name,
            timeout.as_secs_f32()
        )
    } else if e.is_connect() {
        format!("Could not connect to {} agent: {}", tool.name, e)
    } else {
        format!("{} agent request failed: {}", tool.name, e)
    }
}

fn preview(value: &Value) -> String {
    let s = value.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn email() -> ToolSpec {
        ToolSpec::new(
            "email",
            ["recipient", "assignment"],
            Url::parse("http://localhost:1/api/email").unwrap(),
        )
    }

    #[test]
    fn test_request_body_forwards_missing_as_empty() {
        let mut params = BTreeMap::new();
        params.insert("recipient".to_string(), "a@b.com".to_string());
        let body = request_body(&email(), &params);
        assert_eq!(body.get("recipient"), Some(&Value::String("a@b.com".into())));
        assert_eq!(body.get("assignment"), Some(&Value::String(String::new())));
        assert!(body.get("subject").is_none());
    }

    #[test]
    fn test_request_body_omits_undeclared_fields() {
        let mut params = BTreeMap::new();
        params.insert("subject".to_string(), "rust".to_string());
        let body = request_body(&email(), &params);
        assert_eq!(body.len(), 2);
        assert!(!body.contains_key("subject"));
    }

    #[test]
    fn test_parse_body_variants() {
        assert!(parse_body("").is_none());
        assert_eq!(
            parse_body(r#"{"result":"ok"}"#).unwrap().get("result"),
            Some(&Value::String("ok".into()))
        );
        assert_eq!(
            parse_body("Internal Server Error").unwrap().get("raw_response"),
            Some(&Value::String("Internal Server Error".into()))
        );
        assert!(parse_body("[1,2]").unwrap().contains_key("raw_response"));
    }
}
