//! Shared error types for the job attribute service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid document id: {input}")]
    InvalidDocumentId { input: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
