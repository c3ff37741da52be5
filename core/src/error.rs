//! Error types and error handling for the application
//!
//! Each concern keeps its own error enum (`ConfigError`, `ApiError`,
//! `ConnectionError`); `AppError` is what wiring code sees.

use crate::config::ConfigError;
use crate::session::ApiError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Agent server could not be reached or answered garbage
    #[error("Agent server error: {0}")]
    Api(#[from] ApiError),
}
