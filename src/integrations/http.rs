//! HTTP 接口（axum）
//!
//! - POST /api/chat/tools：取最后一条消息跑一轮编排，返回 {"response": ...}
//! - GET /api/tools：已注册工具
//! - GET /health：存活检查

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::core::Orchestrator;

/// 服务状态：编排器在所有请求间只读共享
pub struct HttpState {
    pub orchestrator: Orchestrator,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub name: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

/// 请求体；summary 由外部记忆子系统提供
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<String>,
    pub endpoint: String,
}

pub fn create_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/api/chat/tools", post(chat_with_tools))
        .route("/api/tools", get(list_tools))
        .route("/health", get(health))
        .with_state(state)
}

/// POST /api/chat/tools
async fn chat_with_tools(
    State(state): State<Arc<HttpState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(last) = request.messages.last() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "messages must not be empty".to_string(),
            }),
        ));
    };
    tracing::info!(
        role = %last.role,
        name = last.name.as_deref().unwrap_or(""),
        messages = request.messages.len(),
        "tool chat request"
    );

    let response = state
        .orchestrator
        .respond(&last.content, request.summary.as_deref())
        .await;
    Ok(Json(ChatResponse { response }))
}

/// GET /api/tools
async fn list_tools(State(state): State<Arc<HttpState>>) -> Json<Vec<ToolInfo>> {
    let tools = state
        .orchestrator
        .registry()
        .list_tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name.clone(),
            label: t.label.clone(),
            description: t.description.clone(),
            parameters: t.parameter_names.clone(),
            endpoint: t.endpoint.to_string(),
        })
        .collect();
    Json(tools)
}

/// GET /health
async fn health(State(state): State<Arc<HttpState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "tools": state.orchestrator.registry().tool_names(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
