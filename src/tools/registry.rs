//! 能力注册表
//!
//! 进程启动时由配置构建、之后只读；每个 ToolSpec 描述一个外部 Agent（名称、参数名、端点）。
//! 通过 Arc<ToolRegistry> 以引用传递给分类器与编排器，不存在全局可变表。

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Url;

use crate::config::ToolSection;
use crate::core::CourierError;

/// 分类器在不需要工具时返回的保留名
pub const NO_TOOL: &str = "none";

/// 外部 Agent 声明（不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    /// 参数名，按声明顺序、已去重
    pub parameter_names: Vec<String>,
    pub endpoint: Url,
    pub label: Option<String>,
    pub description: Option<String>,
    /// 覆盖 Dispatcher 的默认超时
    pub timeout: Option<Duration>,
}

impl ToolSpec {
    pub fn new<I, S>(name: impl Into<String>, parameter_names: I, endpoint: Url) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name: String = name.into();
        let mut seen = HashSet::new();
        let parameter_names = parameter_names
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| seen.insert(p.clone()))
            .collect();
        Self {
            name: name.trim().to_string(),
            parameter_names,
            endpoint,
            label: None,
            description: None,
            timeout: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 回复中使用的称呼：label 优先，否则为工具名
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn accepts(&self, parameter: &str) -> bool {
        self.parameter_names.iter().any(|p| p == parameter)
    }
}

/// 能力注册表：构建时校验名称唯一，之后只提供 list_tools / lookup
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new(specs: Vec<ToolSpec>) -> Result<Self, CourierError> {
        let mut names = HashSet::new();
        for spec in &specs {
            let name = spec.name.trim();
            if name.is_empty() || name.eq_ignore_ascii_case(NO_TOOL) {
                return Err(CourierError::ReservedToolName(spec.name.clone()));
            }
            if name != spec.name {
                return Err(CourierError::InvalidToolName(spec.name.clone()));
            }
            // 查找时有大小写不敏感回退，重名判断同样忽略大小写
            if !names.insert(name.to_ascii_lowercase()) {
                return Err(CourierError::DuplicateTool(spec.name.clone()));
            }
        }
        Ok(Self { tools: specs })
    }

    /// 由 [[tools]] 配置构建；端点必须是合法的 http(s) URL
    pub fn from_config(sections: &[ToolSection]) -> Result<Self, CourierError> {
        let specs = sections
            .iter()
            .map(|section| {
                let endpoint = Url::parse(&section.endpoint).map_err(|e| {
                    CourierError::InvalidEndpoint {
                        tool: section.name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                if !matches!(endpoint.scheme(), "http" | "https") {
                    return Err(CourierError::InvalidEndpoint {
                        tool: section.name.clone(),
                        reason: format!("unsupported scheme {}", endpoint.scheme()),
                    });
                }
                let mut spec = ToolSpec::new(&section.name, section.parameters.iter().cloned(), endpoint);
                spec.label = section.label.clone();
                spec.description = section.description.clone();
                spec.timeout = section.timeout_secs.map(Duration::from_secs);
                Ok(spec)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(specs)
    }

    pub fn list_tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, CourierError> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CourierError::UnknownTool(name.to_string()))
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 生成 prompt 中的 Tools available 段落（含 none）
    pub fn prompt_catalog(&self) -> String {
        let mut lines: Vec<String> = self
            .tools
            .iter()
            .map(|t| {
                let description = t.description.as_deref().unwrap_or(t.display_name());
                format!(
                    "- {}: {} (requires: {})",
                    t.name,
                    description,
                    t.parameter_names.join(", ")
                )
            })
            .collect();
        lines.push(format!("- {}: No tool needed", NO_TOOL));
        lines.join("\n")
    }
}
