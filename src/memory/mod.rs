//! 记忆层：对话消息
//!
//! 对话摘要由外部记忆子系统维护，本 crate 只在每轮接收一段可选的 summary 文本。

pub mod conversation;

pub use conversation::{Message, Role};
