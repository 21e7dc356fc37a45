//! # AppError
//!
//! Centralized error handling for the Rusty-Illust ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all ri-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// The declared content type of a submitted image cannot be parsed
    #[error("malformed content type: {0}")]
    MalformedContentType(String),

    /// The submitted payload cannot be interpreted as a raster image
    #[error("malformed image data: {0}")]
    MalformedImageData(String),

    /// Blob store write failure; fatal for the whole batch
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// Resource not found (e.g., Illustration)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Security/Auth failure (e.g., missing or invalid token)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Rusty-Illust logic.
pub type Result<T> = std::result::Result<T, AppError>;
