//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COURIER__*` 覆盖（双下划线表示嵌套，如 `COURIER__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub dispatch: DispatchSection,
    #[serde(default)]
    pub server: ServerSection,
    /// [[tools]]：能力注册表中的外部 Agent
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolSection>,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：意图分类所用模型与采样参数
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：ollama / openai / deepseek / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 采样温度；固定为低值保证同一输入的工具选择可复现
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: 0.0,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "nemotron".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次分类请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

/// [dispatch] 段：调用外部 Agent 的请求预算
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchSection {
    /// Agent 只需立即确认收到请求，预算因此很短
    #[serde(default = "default_dispatch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_dispatch_timeout_secs(),
        }
    }
}

fn default_dispatch_timeout_secs() -> u64 {
    10
}

/// [server] 段：courier-web 监听地址
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

/// [[tools]] 条目：一个外部 Agent 的声明
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSection {
    pub name: String,
    /// 面向用户的称呼，如 "Email"、"Web search"
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    pub endpoint: String,
    /// 覆盖 [dispatch].timeout_secs
    pub timeout_secs: Option<u64>,
}

fn default_tools() -> Vec<ToolSection> {
    vec![
        ToolSection {
            name: "email".into(),
            label: Some("Email".into()),
            description: Some(
                "Write and send an email (recipient email address, assignment describing what the email should be about)"
                    .into(),
            ),
            parameters: vec!["recipient".into(), "assignment".into()],
            endpoint: "http://127.0.0.1:8007/api/write_and_send_email_async".into(),
            timeout_secs: None,
        },
        ToolSection {
            name: "search".into(),
            label: Some("Web search".into()),
            description: Some("Search the web and email the findings (subject/query to search for)".into()),
            parameters: vec!["subject".into()],
            endpoint: "http://127.0.0.1:8006/api/web-search-email".into(),
            timeout_secs: None,
        },
        ToolSection {
            name: "twitter".into(),
            label: Some("Tweet".into()),
            description: Some("Post a tweet (text of the tweet)".into()),
            parameters: vec!["text".into()],
            endpoint: "http://127.0.0.1:8008/api/twitter/post".into(),
            timeout_secs: None,
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            dispatch: DispatchSection::default(),
            server: ServerSection::default(),
            tools: default_tools(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 COURIER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path，则追加该文件（可覆盖前面的键）；文件不存在时返回 NotFound
/// 3. 最后叠加环境变量 COURIER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if !path.exists() {
            return Err(config::ConfigError::NotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COURIER")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
