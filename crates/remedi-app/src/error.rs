use thiserror::Error;

/// Application-level errors (CLI and file layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] remedi_service::error::ServiceError),

    #[error(transparent)]
    CoreError(#[from] remedi_core::error::CoreError),

    #[error("I/O error on {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
