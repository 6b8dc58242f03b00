use thiserror::Error;

use crate::step::WizardStep;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("step not registered: {0}")]
    StepNotRegistered(WizardStep),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("context error: {0}")]
    ContextError(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("a submission is already in flight for session {0}")]
    SubmissionInFlight(String),

    #[error("claim submission failed: {0}")]
    SubmissionFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
