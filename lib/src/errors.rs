// lib/src/errors.rs

use thiserror::Error;

use bincode::error::{DecodeError, EncodeError};
use rx_models::errors::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum RxError {
    /// Schema violations reported by the store.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Malformed request input, such as a bad SSN or date.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization/Deserialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RxError>;

impl From<ValidationError> for RxError {
    fn from(err: ValidationError) -> Self {
        RxError::Validation(ValidationErrors::from(err))
    }
}

impl From<sled::Error> for RxError {
    fn from(err: sled::Error) -> Self {
        RxError::DatabaseError(err.to_string())
    }
}

impl From<EncodeError> for RxError {
    fn from(err: EncodeError) -> Self {
        RxError::SerializationError(format!("bincode encode error: {}", err))
    }
}

impl From<DecodeError> for RxError {
    fn from(err: DecodeError) -> Self {
        RxError::SerializationError(format!("bincode decode error: {}", err))
    }
}
