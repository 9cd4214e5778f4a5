//! 意图识别：LLM 分类与回复解析

pub mod classifier;
pub mod parse;

pub use classifier::{build_messages, IntentClassifier};
pub use parse::{extract_json, parse_classification, Classification};
