//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Ollama / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use mock::MockLlmClient;
pub use ollama::create_ollama_client;
pub use openai::OpenAiClient;
pub use traits::LlmClient;
