//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to initialize the platform (display connection, class registration)
    #[error("Platform initialization failed: {0}")]
    InitFailed(String),

    /// Failed to create a native window
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Platform or extension not available on this system
    #[error("Platform not available: {0}")]
    Unavailable(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
