//! 分类回复解析
//!
//! 从模型输出中提取 JSON（```json ... ``` 或首个 `{` 到最后一个 `}`），
//! 校验形状与工具名后得到 Classification；任何不合规的输出都降级为 Unrecognized。

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::core::ClassifyError;
use crate::tools::{ToolRegistry, ToolSpec, NO_TOOL};

/// 一轮的分类结果：识别到工具，或未识别（含降级原因）
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Recognized {
        tool: String,
        parameters: BTreeMap<String, String>,
        reasoning: Option<String>,
    },
    Unrecognized {
        /// None 表示模型明确选择了 none
        reason: Option<ClassifyError>,
    },
}

impl Classification {
    pub fn none() -> Self {
        Classification::Unrecognized { reason: None }
    }

    pub fn degraded(reason: ClassifyError) -> Self {
        Classification::Unrecognized {
            reason: Some(reason),
        }
    }

    /// 未识别时为 "none"
    pub fn tool_name(&self) -> &str {
        match self {
            Classification::Recognized { tool, .. } => tool,
            Classification::Unrecognized { .. } => NO_TOOL,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Classification::Recognized { .. })
    }
}

/// 模型回复的原始形状；兼容旧字段名 tool_name / tool_params
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(alias = "tool_name")]
    tool: Option<String>,
    #[serde(alias = "tool_params", default)]
    parameters: Option<Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// 提取 JSON 片段；没有 `{` 时返回 None
pub fn extract_json(output: &str) -> Option<&str> {
    let trimmed = output.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()));
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// 解析模型输出；不会失败，异常情况返回带原因的 Unrecognized
pub fn parse_classification(output: &str, registry: &ToolRegistry) -> Classification {
    match try_parse(output, registry) {
        Ok(c) => c,
        Err(reason) => Classification::degraded(reason),
    }
}

fn try_parse(output: &str, registry: &ToolRegistry) -> Result<Classification, ClassifyError> {
    let json_str = extract_json(output)
        .ok_or_else(|| ClassifyError::JsonParseError(format!("no JSON object in: {}", output.trim())))?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| ClassifyError::JsonParseError(format!("{}: {}", e, json_str)))?;
    if !value.is_object() {
        return Err(ClassifyError::SchemaMismatch(json_str.to_string()));
    }
    let raw: RawClassification = serde_json::from_value(value)
        .map_err(|e| ClassifyError::SchemaMismatch(e.to_string()))?;

    let name = raw
        .tool
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ClassifyError::SchemaMismatch("missing tool".to_string()))?;
    if name.is_empty() || name.eq_ignore_ascii_case(NO_TOOL) {
        return Ok(Classification::none());
    }

    let spec = find_tool(registry, name)?;
    let parameters = normalize_parameters(spec, raw.parameters)?;

    Ok(Classification::Recognized {
        tool: spec.name.clone(),
        parameters,
        reasoning: raw.reasoning.filter(|r| !r.trim().is_empty()),
    })
}

fn find_tool<'a>(registry: &'a ToolRegistry, name: &str) -> Result<&'a ToolSpec, ClassifyError> {
    registry
        .lookup(name)
        .ok()
        .or_else(|| {
            registry
                .list_tools()
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| ClassifyError::UnknownTool(name.to_string()))
}

/// 只保留工具声明的参数；数字 / 布尔转为字符串，null 视为缺失
fn normalize_parameters(
    spec: &ToolSpec,
    raw: Option<Value>,
) -> Result<BTreeMap<String, String>, ClassifyError> {
    let map = match raw {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ClassifyError::SchemaMismatch(format!(
                "parameters must be an object, got {}",
                other
            )))
        }
    };

    let mut parameters = BTreeMap::new();
    for (key, value) in map {
        if !spec.accepts(&key) {
            tracing::warn!(tool = %spec.name, parameter = %key, "dropping undeclared parameter");
            continue;
        }
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        parameters.insert(key, value);
    }
    Ok(parameters)
}
