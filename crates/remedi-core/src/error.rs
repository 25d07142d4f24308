use thiserror::Error;

/// Errors raised while loading settings or checking domain records
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A record is well-formed but cannot be used as given.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
