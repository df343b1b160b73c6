//! LLM domain: schema-constrained AI calls.
//!
//! Public API for the advisory layer of AgroPulse.
//! External code should only use the items exported here.
//!
//! Pipeline:
//!   - schema.rs: Schema Registry (expected response shape per task)
//!   - prompts.rs: Prompt Builder (instruction text + schema + image)
//!   - gateway.rs: AI Gateway (call, parse, validate, decode)
//!   - types.rs: typed task outputs
//!
//! Transports:
//!   - gemini.rs: Google Gemini `generateContent`
//!   - transport_fake.rs: scripted replies for tests
//!   - provider.rs: credentials + model tiers

pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod provider;
pub mod schema;
pub mod transport;
pub mod transport_fake;
pub mod types;

pub use gateway::AiGateway;
pub use gemini::GeminiTransport;
pub use prompts::{build_prompt, PromptRequest, TaskInput};
pub use schema::{schema_for, ResponseSchema, TaskKind};
pub use transport::Transport;
pub use types::TaskResult;

/// First `max` characters of `s`, for log lines.
pub(crate) fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
