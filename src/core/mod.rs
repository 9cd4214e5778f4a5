//! 核心编排层：错误、单轮状态、回复合成、编排状态机

pub mod error;
pub mod orchestrator;
pub mod state;
pub mod synthesizer;

pub use error::{ClassifyError, CourierError, DispatchError};
pub use orchestrator::{create_llm_from_config, create_orchestrator, Orchestrator};
pub use state::{TurnPhase, TurnState};
pub use synthesizer::{no_action, synthesize, ACCEPTED_MARKER, NO_ACTION_MARKER};
