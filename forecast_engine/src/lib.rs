//! # Forecast Engine
//!
//! Analytics core of a rolling financial forecast: predictions for forecast
//! lines, forecast-versus-actual reconciliation and rolling snapshots.
//!
//! ## Features
//!
//! - Linear trend extrapolation with monthly seasonality and a confidence band
//! - Variance analysis with MAPE, RMSE and rule-based recommendations
//! - Immutable point-in-time snapshots of rolling forecasts
//! - Serde model matching the persisted forecast module (camelCase JSON)
//!
//! Every operation receives the forecast module by reference and returns a
//! replaced copy, leaving persistence to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use forecast_engine::prelude::*;
//! use forecast_math::{PeriodKey, PeriodSeries, TrendDirection};
//!
//! let history: Vec<f64> = (0..24).map(|i| 1000.0 + 60.0 * i as f64).collect();
//! let start: PeriodKey = "2023-01".parse().unwrap();
//! let line = ForecastLine::new("706000")
//!     .with_actual_values(PeriodSeries::consecutive(start, &history));
//! let line_id = line.id.clone();
//!
//! let mut forecast = Forecast::new("FY2025", 2025);
//! let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let version_id = forecast
//!     .add_version(ForecastVersion::new("", "V1", reference).with_lines(vec![line]))
//!     .id
//!     .clone();
//! let forecast_id = forecast.id.clone();
//! let module = ForecastModule { forecasts: vec![forecast], ..Default::default() };
//!
//! let analytics = ForecastAnalytics::new(AnalyticsConfig::default()).unwrap();
//! let prediction = analytics
//!     .generate_predictions(&module, &forecast_id, &version_id, &line_id, 24)
//!     .unwrap()
//!     .commit(|_new_module| { /* persist */ })
//!     .applied()
//!     .unwrap();
//!
//! assert_eq!(prediction.trend.trend, TrendDirection::Increasing);
//! assert_eq!(prediction.ml_prediction.confidence, 60);
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod outcome;
pub mod prediction;
pub mod reconciliation;
pub mod rolling;
pub mod service;

// Re-export commonly used types
pub use crate::config::AnalyticsConfig;
pub use crate::error::{ForecastError, Result};
pub use crate::outcome::{ModuleUpdate, Outcome, SkipReason};
pub use crate::service::ForecastAnalytics;

pub mod prelude {
    pub use crate::config::AnalyticsConfig;
    pub use crate::error::ForecastError;
    pub use crate::metrics::AccuracyMetrics;
    pub use crate::model::{
        ActualData, Forecast, ForecastLine, ForecastMethod, ForecastModule,
        ForecastReconciliationReport, ForecastVarianceAnalysis, ForecastVersion, MlPrediction,
        RollingForecastSnapshot,
    };
    pub use crate::outcome::{ModuleUpdate, Outcome, SkipReason};
    pub use crate::prediction::{Prediction, PredictionGenerator};
    pub use crate::reconciliation::{ReconciliationEngine, Recommendation};
    pub use crate::rolling::RollingSnapshotManager;
    pub use crate::service::{ForecastAnalytics, VersionPredictions};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
