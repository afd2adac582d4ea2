//! Error types for depthcast

use thiserror::Error;

/// Main error type for depthcast operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Camera parameters were never set")]
    MissingCameraParameters,
}

/// Result type alias for depthcast operations
pub type Result<T> = std::result::Result<T, Error>;
