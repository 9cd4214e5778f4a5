//! 单轮状态
//!
//! TurnState 只属于一次请求/响应周期，由 Orchestrator 独占，返回后即丢弃。

use uuid::Uuid;

use crate::intent::Classification;
use crate::tools::DispatchOutcome;

/// 编排阶段：Start → Classified → Dispatched → Done，未识别时 Classified → Done
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Start,
    Classified,
    Dispatched,
    Done,
}

#[derive(Clone, Debug)]
pub struct TurnState {
    /// 仅用于日志关联，不会出现在回复中
    pub turn_id: Uuid,
    pub user_message: String,
    pub phase: TurnPhase,
    pub classification: Option<Classification>,
    pub outcome: Option<DispatchOutcome>,
    pub final_message: Option<String>,
}

impl TurnState {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            user_message: user_message.into(),
            phase: TurnPhase::Start,
            classification: None,
            outcome: None,
            final_message: None,
        }
    }

    /// Done 之后必有 final_message；未完成时为空串
    pub fn final_message(&self) -> &str {
        self.final_message.as_deref().unwrap_or_default()
    }

    /// 是否发生了派发（即是否调用了外部 Agent）
    pub fn dispatched(&self) -> bool {
        self.outcome.is_some()
    }
}
