//! Fake transport for testing.
//!
//! Uses scripted payload strings instead of real HTTP calls. Replies are
//! consumed in order; a gated reply holds its call open until the test
//! releases it, which is how out-of-order completion is reproduced.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

use super::prompts::PromptRequest;
use super::transport::Transport;
use crate::error::GatewayError;

pub enum Reply {
    Ready(Result<String, GatewayError>),
    Gated(oneshot::Receiver<Result<String, GatewayError>>),
}

/// Releases a gated reply.
pub type Gate = oneshot::Sender<Result<String, GatewayError>>;

pub struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    /// Returned once the script runs out (if set).
    fallback: Option<Result<String, GatewayError>>,
    requests: Mutex<Vec<PromptRequest>>,
}

impl FakeTransport {
    /// Every call returns the same payload.
    pub fn new(payload: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(Ok(payload.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a network error.
    pub fn with_error(msg: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(Err(GatewayError::Transport(msg.to_string()))),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies are handed out in order, one per call.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A gated reply plus the sender that releases it.
    pub fn gate() -> (Gate, Reply) {
        let (tx, rx) = oneshot::channel();
        (tx, Reply::Gated(rx))
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<PromptRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(GatewayError::Transport("gate dropped".to_string()))
            }),
            None => self.fallback.clone().unwrap_or_else(|| {
                Err(GatewayError::Transport("no scripted reply left".to_string()))
            }),
        }
    }
}
