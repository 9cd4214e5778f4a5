//! 派发结果：状态分类与响应体
//!
//! DispatchOutcome 由 Dispatcher 创建、随即交给 Synthesizer 消费，不持久化。

use serde_json::{Map, Value};

use crate::core::DispatchError;

/// 状态码归类；ConnectionFailure 不对应任何状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Accepted,
    ClientError,
    ServerError,
    ConnectionFailure,
}

impl StatusClass {
    /// 200 → Success，202 → Accepted，4xx → ClientError，5xx → ServerError；
    /// 其余 2xx 视为 Success，其他状态码视为 Agent 违反契约（ServerError）
    pub fn from_status(code: u16) -> Self {
        match code {
            202 => StatusClass::Accepted,
            200..=299 => StatusClass::Success,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Accepted => "accepted",
            StatusClass::ClientError => "client_error",
            StatusClass::ServerError => "server_error",
            StatusClass::ConnectionFailure => "connection_failure",
        }
    }
}

/// 单次派发的结果
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub status_class: StatusClass,
    pub status_code: Option<u16>,
    pub body: Option<Map<String, Value>>,
    pub error_detail: Option<String>,
}

impl DispatchOutcome {
    /// 收到 HTTP 响应（任意状态码）
    pub fn from_response(status_code: u16, body: Option<Map<String, Value>>) -> Self {
        Self {
            status_class: StatusClass::from_status(status_code),
            status_code: Some(status_code),
            body,
            error_detail: None,
        }
    }

    /// 超时 / DNS / 拒绝连接：无状态码
    pub fn connection_failure(detail: impl Into<String>) -> Self {
        Self {
            status_class: StatusClass::ConnectionFailure,
            status_code: None,
            body: None,
            error_detail: Some(detail.into()),
        }
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    /// 按 key 取响应体中的字符串字段
    pub fn body_str(&self, key: &str) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 响应体中最可读的错误文本：error → detail → message → raw_response
    pub fn error_text(&self) -> Option<String> {
        const ERROR_FIELDS: [&str; 4] = ["error", "detail", "message", "raw_response"];
        let body = self.body.as_ref()?;
        ERROR_FIELDS.iter().find_map(|key| match body.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        })
    }

    /// 失败结果的错误视图；Success / Accepted 返回 None
    pub fn as_error(&self) -> Option<DispatchError> {
        let message = || {
            self.error_text()
                .or_else(|| self.error_detail.clone())
                .unwrap_or_default()
        };
        match self.status_class {
            StatusClass::Success | StatusClass::Accepted => None,
            StatusClass::ClientError => Some(DispatchError::ClientError {
                status: self.status_code.unwrap_or_default(),
                message: message(),
            }),
            StatusClass::ServerError => Some(DispatchError::ServerError {
                status: self.status_code.unwrap_or_default(),
                message: message(),
            }),
            StatusClass::ConnectionFailure => Some(DispatchError::ConnectionFailure(
                self.error_detail.clone().unwrap_or_default(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Option<Map<String, Value>> {
        v.as_object().cloned()
    }

    #[test]
    fn test_status_table() {
        assert_eq!(StatusClass::from_status(200), StatusClass::Success);
        assert_eq!(StatusClass::from_status(202), StatusClass::Accepted);
        assert_eq!(StatusClass::from_status(400), StatusClass::ClientError);
        assert_eq!(StatusClass::from_status(422), StatusClass::ClientError);
        assert_eq!(StatusClass::from_status(499), StatusClass::ClientError);
        assert_eq!(StatusClass::from_status(500), StatusClass::ServerError);
        assert_eq!(StatusClass::from_status(599), StatusClass::ServerError);
    }

    #[test]
    fn test_status_outside_contract() {
        assert_eq!(StatusClass::from_status(204), StatusClass::Success);
        assert_eq!(StatusClass::from_status(302), StatusClass::ServerError);
        assert_eq!(StatusClass::from_status(101), StatusClass::ServerError);
    }

    #[test]
    fn test_error_text_prefers_error_field() {
        let outcome =
            DispatchOutcome::from_response(500, body(json!({"error": "boom", "message": "other"})));
        assert_eq!(outcome.error_text().as_deref(), Some("boom"));

        let outcome = DispatchOutcome::from_response(422, body(json!({"detail": [{"msg": "bad"}]})));
        assert_eq!(outcome.error_text().as_deref(), Some(r#"[{"msg":"bad"}]"#));

        let outcome = DispatchOutcome::from_response(500, body(json!({"status": "failed"})));
        assert_eq!(outcome.error_text(), None);
    }

    #[test]
    fn test_connection_failure_has_no_status() {
        let outcome = DispatchOutcome::connection_failure("connection refused");
        assert_eq!(outcome.status_code, None);
        assert_eq!(
            outcome.as_error(),
            Some(DispatchError::ConnectionFailure("connection refused".into()))
        );
    }

    #[test]
    fn test_as_error_none_for_success() {
        let outcome = DispatchOutcome::from_response(202, body(json!({"message": "queued"})));
        assert!(outcome.as_error().is_none());
    }
}
