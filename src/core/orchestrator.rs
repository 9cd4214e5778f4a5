//! 编排器：单轮状态机
//!
//! 负责：从配置创建 LLM / 注册表 / 分类器 / 派发器，并对每条用户消息线性执行
//! classify → dispatch → synthesize。每轮最多两次外部调用（分类器、Agent），无循环、无重入。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;

use crate::config::{load_config, AppConfig};
use crate::core::{no_action, synthesize, CourierError, TurnPhase, TurnState};
use crate::intent::{Classification, IntentClassifier};
use crate::llm::{create_deepseek_client, create_ollama_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::tools::{Dispatcher, ToolRegistry};

/// 根据配置与环境变量选择 LLM 后端（Ollama / OpenAI 兼容 / DeepSeek / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let temperature = cfg.llm.temperature;
    match provider.as_str() {
        "mock" => {
            tracing::warn!("Using Mock LLM (echoes input as a search request)");
            Arc::new(MockLlmClient::echo())
        }
        "deepseek" => {
            tracing::info!("Using DeepSeek LLM ({})", cfg.llm.model);
            Arc::new(
                create_deepseek_client(Some(&cfg.llm.model))
                    .with_temperature(temperature)
                    .with_json_mode(true),
            )
        }
        "openai" => {
            tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
            Arc::new(
                OpenAiClient::new(cfg.llm.base_url.as_deref(), &cfg.llm.model, None)
                    .with_temperature(temperature)
                    .with_json_mode(true),
            )
        }
        other => {
            if other != "ollama" {
                tracing::warn!("Unknown LLM provider {:?}, falling back to Ollama", other);
            }
            tracing::info!("Using Ollama LLM ({})", cfg.llm.model);
            Arc::new(
                create_ollama_client(cfg.llm.base_url.as_deref(), &cfg.llm.model)
                    .with_temperature(temperature)
                    .with_json_mode(true),
            )
        }
    }
}

/// 编排器：注册表只读共享，分类器与派发器无可变状态，可在多个并发轮次间共享（Arc<Orchestrator>）
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        classifier: IntentClassifier,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            registry,
            classifier,
            dispatcher,
        }
    }

    /// 从配置构建；注册表非法（重名、端点无效）时返回错误
    pub fn from_config(cfg: &AppConfig) -> Result<Self, CourierError> {
        let registry = Arc::new(ToolRegistry::from_config(&cfg.tools)?);
        let llm = create_llm_from_config(cfg);
        tracing::info!(tools = ?registry.tool_names(), "capability registry loaded");
        Ok(Self::new(
            registry,
            IntentClassifier::new(llm, cfg.llm.timeouts.request),
            Dispatcher::new(cfg.dispatch.timeout_secs)?,
        ))
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// 跑完一轮并返回最终状态（phase 必为 Done）
    pub async fn run_turn(&self, user_message: &str, context: Option<&str>) -> TurnState {
        let mut state = TurnState::new(user_message);
        let span = tracing::info_span!("turn", turn_id = %state.turn_id);
        async {
            tracing::info!(message = %preview(user_message), "turn started");
            loop {
                match state.phase {
                    TurnPhase::Start => {
                        let classification = self
                            .classifier
                            .classify(&state.user_message, &self.registry, context)
                            .await;
                        state.classification = Some(classification);
                        state.phase = TurnPhase::Classified;
                    }
                    TurnPhase::Classified => self.dispatch_or_finish(&mut state).await,
                    TurnPhase::Dispatched => {
                        let message = match (&state.classification, &state.outcome) {
                            (Some(Classification::Recognized { tool, .. }), Some(outcome)) => {
                                let name = self
                                    .registry
                                    .lookup(tool)
                                    .map(|spec| spec.display_name())
                                    .unwrap_or(tool.as_str());
                                synthesize(name, outcome)
                            }
                            _ => no_action(&self.registry),
                        };
                        state.final_message = Some(message);
                        state.phase = TurnPhase::Done;
                    }
                    TurnPhase::Done => break,
                }
            }
            tracing::info!(
                tool = state
                    .classification
                    .as_ref()
                    .map(Classification::tool_name)
                    .unwrap_or("none"),
                dispatched = state.dispatched(),
                "turn finished"
            );
        }
        .instrument(span)
        .await;
        state
    }

    /// 只返回最终回复文本
    pub async fn respond(&self, user_message: &str, context: Option<&str>) -> String {
        let state = self.run_turn(user_message, context).await;
        state.final_message.unwrap_or_default()
    }

    /// Classified：识别到工具则派发一次，否则直接以 no-action 回复结束
    async fn dispatch_or_finish(&self, state: &mut TurnState) {
        let selected = match &state.classification {
            Some(Classification::Recognized { tool, parameters, .. }) => self
                .registry
                .lookup(tool)
                .ok()
                .map(|spec| (spec, parameters)),
            _ => None,
        };
        match selected {
            Some((spec, parameters)) => {
                state.outcome = Some(self.dispatcher.dispatch(spec, parameters).await);
                state.phase = TurnPhase::Dispatched;
            }
            None => {
                state.final_message = Some(no_action(&self.registry));
                state.phase = TurnPhase::Done;
            }
        }
    }
}

/// 从配置文件构建编排器（供二进制入口使用）
///
/// 显式传入的配置加载失败时返回错误；未传入时回退到内置默认值
pub fn create_orchestrator(config_path: Option<PathBuf>) -> anyhow::Result<(AppConfig, Orchestrator)> {
    let explicit = config_path.clone();
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => match explicit {
            Some(path) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to load config {}", path.display())))
            }
            None => {
                tracing::warn!("Config load failed ({}), using defaults", e);
                AppConfig::default()
            }
        },
    };
    let orchestrator = Orchestrator::from_config(&cfg)?;
    Ok((cfg, orchestrator))
}

fn preview(s: &str) -> String {
    if s.chars().count() > 50 {
        format!("{}...", s.chars().take(50).collect::<String>())
    } else {
        s.to_string()
    }
}
