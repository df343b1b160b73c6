//! AI Gateway: one generic call for every task.
//!
//! Steps:
//! 1. Send the prompt through the transport (exactly one outbound call)
//! 2. Strip whitespace / a Markdown fence around the payload
//! 3. Parse JSON
//! 4. Validate against the task's schema
//! 5. Decode into the typed `TaskResult`
//!
//! Either the whole result validates or the caller gets an error. No
//! caching and no retries: every failure goes back to the user.

use std::sync::Arc;

use super::prompts::PromptRequest;
use super::transport::Transport;
use super::types::{FromTaskResult, TaskResult};
use crate::error::GatewayError;

pub struct AiGateway {
    transport: Arc<dyn Transport>,
}

impl AiGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Run one task and return its schema-conformant result.
    pub async fn invoke(&self, request: &PromptRequest) -> Result<TaskResult, GatewayError> {
        let start = std::time::Instant::now();
        let raw = self.transport.generate(request).await?;
        let result = decode_payload(request, &raw);

        match &result {
            Ok(_) => log::info!(
                "[GATEWAY] {} ok in {}ms",
                request.kind,
                start.elapsed().as_millis()
            ),
            Err(e) => {
                log::warn!("[GATEWAY] {} rejected: {}", request.kind, e);
                log::warn!("[GATEWAY] Raw payload: {}", super::preview(&raw, 200));
            }
        }
        result
    }

    /// `invoke`, narrowed to the output type the caller expects.
    pub async fn run<T: FromTaskResult>(&self, request: &PromptRequest) -> Result<T, GatewayError> {
        T::from_result(self.invoke(request).await?)
    }
}

/// Parse and validate a raw model payload for the request's task.
pub fn decode_payload(request: &PromptRequest, raw: &str) -> Result<TaskResult, GatewayError> {
    let json_str = strip_code_fences(raw);
    if json_str.is_empty() {
        return Err(GatewayError::Malformed("empty response".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| GatewayError::Malformed(format!("not JSON: {}", e)))?;

    request
        .schema
        .validate(&value)
        .map_err(|v| GatewayError::Malformed(v.to_string()))?;

    TaskResult::decode(request.kind, value)
}

/// Remove surrounding whitespace and one ```json fence, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => return trimmed,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::{build_prompt, TaskInput};
    use crate::llm::transport_fake::FakeTransport;
    use crate::llm::types::MarketAdvice;

    fn market_prompt() -> PromptRequest {
        build_prompt(&TaskInput::MarketAdvice {
            price_history: "Jan 25: ₹3200".into(),
        })
    }

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  [1]  \n"), "[1]");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn empty_payload_is_malformed() {
        let err = decode_payload(&market_prompt(), "   ").unwrap_err();
        assert_eq!(err, GatewayError::Malformed("empty response".to_string()));
    }

    #[test]
    fn prose_payload_is_malformed() {
        let err = decode_payload(&market_prompt(), "You should wait.").unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
    }

    #[tokio::test]
    async fn run_returns_typed_output() {
        let transport = Arc::new(FakeTransport::new(
            r#"{"advice":"Sell Now","reasoning":"Peak arrivals ahead"}"#,
        ));
        let gateway = AiGateway::new(transport.clone());
        let advice: MarketAdvice = gateway.run(&market_prompt()).await.unwrap();
        assert_eq!(advice.advice, "Sell Now");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn transport_error_passes_through_without_retry() {
        let transport = Arc::new(FakeTransport::with_error("connection refused"));
        let gateway = AiGateway::new(transport.clone());
        let err = gateway.invoke(&market_prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(transport.call_count(), 1);
    }
}
