//! Request lifecycle for one interactive action.
//!
//! Idle → Pending → Succeeded | Failed, re-enterable forever. Every
//! `begin` takes a new sequence number; a response is only applied if its
//! ticket still carries the latest number, so a slow earlier call can never
//! overwrite a newer Pending or Succeeded state.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::TaskError;

/// A failed action: the error plus the alert text shown to the farmer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    #[serde(serialize_with = "serialize_kind")]
    pub error: TaskError,
    pub message: String,
}

fn serialize_kind<S: serde::Serializer>(error: &TaskError, s: S) -> Result<S::Ok, S::Error> {
    error.kind().serialize(s)
}

impl Failure {
    pub fn new(error: TaskError) -> Self {
        let message = error.user_message();
        Self { error, message }
    }

    pub fn with_message(error: TaskError, message: &str) -> Self {
        Self {
            error,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "value", rename_all = "camelCase")]
pub enum Phase<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(Failure),
}

/// Proof that a request was started; carries its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

/// What happened to a response when it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The response became the current state.
    Applied,
    /// A newer request (or a reset) superseded it; it was discarded.
    Stale,
    /// Nothing was requested (no input supplied).
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    seq: u64,
    key: Option<String>,
    phase: Phase<T>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            seq: 0,
            key: None,
            phase: Phase::Idle,
        }
    }
}

impl<T> RequestState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any in flight.
    pub fn begin(&mut self) -> Ticket {
        self.begin_keyed(None)
    }

    /// Start a request tagged with a key (e.g. the crop whose guide is loading).
    pub fn begin_keyed(&mut self, key: Option<String>) -> Ticket {
        self.seq += 1;
        self.key = key;
        self.phase = Phase::Pending;
        Ticket { seq: self.seq }
    }

    /// Apply a response if its ticket is still current.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, Failure>) -> Settlement {
        if ticket.seq != self.seq {
            log::debug!(
                "[VIEW] Discarding stale response #{} (latest #{})",
                ticket.seq,
                self.seq
            );
            return Settlement::Stale;
        }
        self.phase = match outcome {
            Ok(value) => Phase::Succeeded(value),
            Err(failure) => Phase::Failed(failure),
        };
        Settlement::Applied
    }

    /// Back to Idle; any request in flight becomes stale.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.key = None;
        self.phase = Phase::Idle;
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            Phase::Succeeded(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.phase {
            Phase::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// A `RequestState` shared between a controller and its in-flight futures.
///
/// The lock is only ever held for a transition, never across an await.
#[derive(Debug)]
pub struct Slot<T> {
    inner: Mutex<RequestState<T>>,
}

impl<T: Clone> Slot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RequestState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestState<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self) -> Ticket {
        self.lock().begin()
    }

    pub fn begin_keyed(&self, key: &str) -> Ticket {
        self.lock().begin_keyed(Some(key.to_string()))
    }

    pub fn settle(&self, ticket: Ticket, outcome: Result<T, Failure>) -> Settlement {
        self.lock().settle(ticket, outcome)
    }

    pub fn reset(&self) {
        self.lock().reset()
    }

    pub fn phase(&self) -> Phase<T> {
        self.lock().phase().clone()
    }

    pub fn key(&self) -> Option<String> {
        self.lock().key().map(str::to_string)
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    pub fn value(&self) -> Option<T> {
        self.lock().value().cloned()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.lock().failure().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(msg: &str) -> Failure {
        Failure::new(TaskError::TransportFailure(msg.to_string()))
    }

    #[test]
    fn starts_idle() {
        let state: RequestState<u32> = RequestState::new();
        assert_eq!(state.phase(), &Phase::Idle);
    }

    #[test]
    fn success_then_retrigger_goes_pending() {
        let mut state = RequestState::new();
        let t = state.begin();
        assert!(state.is_pending());
        assert_eq!(state.settle(t, Ok(7)), Settlement::Applied);
        assert_eq!(state.value(), Some(&7));

        state.begin();
        assert!(state.is_pending());
        assert_eq!(state.value(), None);
    }

    #[test]
    fn failure_is_reenterable() {
        let mut state: RequestState<u32> = RequestState::new();
        let t = state.begin();
        state.settle(t, Err(failed("offline")));
        assert!(state.failure().is_some());

        let t = state.begin();
        assert_eq!(state.settle(t, Ok(1)), Settlement::Applied);
        assert_eq!(state.value(), Some(&1));
    }

    #[test]
    fn late_response_from_older_request_is_discarded() {
        let mut state = RequestState::new();
        let a = state.begin();
        let b = state.begin();
        assert_eq!(state.settle(b, Ok("B")), Settlement::Applied);
        assert_eq!(state.settle(a, Ok("A")), Settlement::Stale);
        assert_eq!(state.value(), Some(&"B"));
    }

    #[test]
    fn older_response_cannot_end_newer_pending() {
        let mut state: RequestState<&str> = RequestState::new();
        let a = state.begin();
        let _b = state.begin();
        assert_eq!(state.settle(a, Err(failed("late"))), Settlement::Stale);
        assert!(state.is_pending());
    }

    #[test]
    fn reset_invalidates_in_flight() {
        let mut state = RequestState::new();
        let t = state.begin_keyed(Some("Rice".into()));
        assert_eq!(state.key(), Some("Rice"));
        state.reset();
        assert_eq!(state.settle(t, Ok(3)), Settlement::Stale);
        assert_eq!(state.phase(), &Phase::Idle);
        assert_eq!(state.key(), None);
    }

    #[test]
    fn slot_tracks_the_same_rules() {
        let slot: Slot<u8> = Slot::new();
        let a = slot.begin();
        let b = slot.begin();
        slot.settle(b, Ok(2));
        slot.settle(a, Ok(1));
        assert_eq!(slot.value(), Some(2));
    }
}
