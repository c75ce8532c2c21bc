//! # Forecast Math
//!
//! Numeric building blocks for monthly financial forecasts.
//! This crate provides the calendar-month period type, ordered period series
//! and the two analyzers the prediction pipeline is built on:
//!
//! - **Trend**: ordinary least-squares line over equally spaced periods
//! - **Seasonality**: lag-12 autocorrelation test for monthly cycles
//!
//! ```
//! use forecast_math::{calculate_trend, detect_seasonality, TrendDirection};
//!
//! let values: Vec<f64> = (0..12).map(|i| 100.0 + 10.0 * i as f64).collect();
//! let trend = calculate_trend(&values).unwrap();
//! assert_eq!(trend.trend, TrendDirection::Increasing);
//! assert!(!detect_seasonality(&values).has_season);
//! ```

use thiserror::Error;

pub mod period;
pub mod seasonality;
pub mod series;
pub mod stats;
pub mod trend;

pub use period::PeriodKey;
pub use seasonality::{detect_seasonality, SeasonalityDetector, SeasonalityResult, SEASONAL_LAG};
pub use series::PeriodSeries;
pub use trend::{calculate_trend, TrendAnalyzer, TrendDirection, TrendResult};

/// Errors that can occur in forecast calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid period key: {0}")]
    InvalidPeriod(String),
}

/// Result type for forecast math operations
pub type Result<T> = std::result::Result<T, MathError>;
