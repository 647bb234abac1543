//! Handler contract.

use chainfee_core::Msg;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful handler result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerOutput {
    /// Opaque payload returned to the client
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
    /// Human readable log line
    #[serde(default)]
    pub log: String,
    /// Indexable key/value tags
    #[serde(default)]
    pub tags: Vec<(String, String)>,
}

impl HandlerOutput {
    /// Output carrying only a log line
    pub fn with_log(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            ..Self::default()
        }
    }

    /// Appends a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }
}

/// Message-level execution failure. Local to the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler error (code {code}): {message}")]
pub struct HandlerError {
    /// Application error code
    pub code: u32,
    /// Description
    pub message: String,
}

impl HandlerError {
    /// Creates a handler error
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// State mutation bound to a message type.
///
/// When `simulate` is set the call is a dry run and must not persist side
/// effects.
pub trait Handler<S>: Send + Sync {
    /// Executes `msg` against `state`.
    fn handle(&self, state: &mut S, msg: &dyn Msg, simulate: bool)
        -> Result<HandlerOutput, HandlerError>;
}

impl<S, F> Handler<S> for F
where
    F: Fn(&mut S, &dyn Msg, bool) -> Result<HandlerOutput, HandlerError> + Send + Sync,
{
    fn handle(
        &self,
        state: &mut S,
        msg: &dyn Msg,
        simulate: bool,
    ) -> Result<HandlerOutput, HandlerError> {
        self(state, msg, simulate)
    }
}
