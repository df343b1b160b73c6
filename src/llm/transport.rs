//! Transport seam: the only place a request leaves the process.
//!
//! Abstraction over the inference service so the gateway can be tested
//! with `FakeTransport`.

use async_trait::async_trait;

use super::prompts::PromptRequest;
use crate::error::GatewayError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the model's raw text payload.
    ///
    /// Implementations must fail with `GatewayError::Transport` on network
    /// errors, timeouts and non-2xx statuses. They do not parse the payload.
    async fn generate(&self, request: &PromptRequest) -> Result<String, GatewayError>;
}
