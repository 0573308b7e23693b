//! LLM integration: decision trait, HTTP client, response parsing

pub mod client;
pub mod decision;
pub mod parser;

pub use client::LlmClient;
pub use decision::{DecisionMaker, TokenSink, DEFAULT_IMPORTANCE};
pub use parser::{extract_json, parse_action};
