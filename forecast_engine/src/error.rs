//! Error types for the forecast_engine crate

use forecast_math::MathError;
use thiserror::Error;

/// Custom error types for the forecast_engine crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No forecast with this id in the module
    #[error("Forecast not found: {0}")]
    ForecastNotFound(String),

    /// The forecast exists but has no version with this id
    #[error("Version {version_id} not found in forecast {forecast_id}")]
    VersionNotFound {
        forecast_id: String,
        version_id: String,
    },

    /// The version exists but has no line with this id
    #[error("Line {line_id} not found in version {version_id}")]
    LineNotFound { version_id: String, line_id: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error in analytics configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from calendar date handling
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from period or series calculations
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<chrono::ParseError> for ForecastError {
    fn from(err: chrono::ParseError) -> Self {
        ForecastError::InvalidDate(err.to_string())
    }
}
