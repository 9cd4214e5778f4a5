//! Ollama 客户端（经由 Ollama 的 OpenAI 兼容端点 `/v1`）
//!
//! Base URL 取自配置或环境变量 `OLLAMA_BASE_URL`，默认 http://ollama:11436。

use crate::llm::OpenAiClient;

pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://ollama:11436";

/// Ollama 不校验 API Key，这里传占位值
pub fn create_ollama_client(base_url: Option<&str>, model: &str) -> OpenAiClient {
    let base = base_url
        .map(String::from)
        .or_else(|| std::env::var("OLLAMA_BASE_URL").ok())
        .unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_string());
    OpenAiClient::new(Some(&openai_compatible_base(&base)), model, Some("ollama"))
}

/// http://host:port 或 http://host:port/ → http://host:port/v1；已带 /v1 的保持不变
fn openai_compatible_base(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1") {
        base.to_string()
    } else {
        format!("{}/v1", base)
    }
}
