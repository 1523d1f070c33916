//! services/dashboard/src/error.rs
//!
//! Defines the top-level error type for the dashboard binary.

use agri_core::TransportError;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The error type `main` returns; library code reports `ApiError` instead.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An endpoint call that failed after retries, or returned an invalid payload.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Represents a failure to build the HTTP client.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
