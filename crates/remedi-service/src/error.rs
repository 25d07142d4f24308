use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RecurrenceError(#[from] remedi_recurrence::error::RecurrenceError),

    #[error(transparent)]
    CoreError(#[from] remedi_core::error::CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dispatch error: {0}")]
    DispatchError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
