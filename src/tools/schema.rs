//! 分类结果 JSON Schema 生成（schemars）
//!
//! 注入分类 prompt，约束模型只输出 `{"tool": "...", "parameters": {...}}`。

use schemars::{schema_for, JsonSchema};
use std::collections::HashMap;

/// 分类器期望的回复格式（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ClassificationFormat {
    /// 工具名，如 email、search，或 none 表示无需工具
    pub tool: String,
    /// 工具参数，键为该工具声明的参数名
    pub parameters: HashMap<String, String>,
    /// 选择理由（一句话）
    pub reasoning: Option<String>,
}

/// 返回分类回复的 JSON Schema 字符串，可拼入 system prompt
pub fn classification_schema_json() -> String {
    let schema = schema_for!(ClassificationFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_tool_and_parameters() {
        let schema: serde_json::Value = serde_json::from_str(&classification_schema_json()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "tool"));
        assert!(required.iter().any(|v| v == "parameters"));
        assert!(!required.iter().any(|v| v == "reasoning"));
    }
}
