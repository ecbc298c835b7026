use thiserror::Error;

use crate::state::Step;

/// Errors produced by the conversation core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("no active session for this user")]
    SessionNotFound,
    #[error("operation '{operation}' is not valid at step {step:?}")]
    InvalidStep { step: Step, operation: &'static str },
}

pub type ConversationResult<T> = Result<T, ConversationError>;
