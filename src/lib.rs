//! # Rolling Forecast
//!
//! `rolling_forecast` bundles the two crates of the forecasting analytics core:
//!
//! - [`math`] (`forecast_math`): `YYYY-MM` periods, period series, trend and
//!   seasonality calculations
//! - [`engine`] (`forecast_engine`): line predictions, reconciliation reports
//!   and rolling snapshots over a serde model of the forecast module
//!
//! ## Example
//!
//! ```
//! use rolling_forecast::prelude::*;
//!
//! let start: PeriodKey = "2024-01".parse().unwrap();
//! let history = PeriodSeries::consecutive(start, &[100.0, 110.0, 120.0, 130.0]);
//!
//! let trend = calculate_trend(&history.values()).unwrap();
//! assert_eq!(trend.trend, TrendDirection::Increasing);
//!
//! let predictor = PredictionGenerator::new(&AnalyticsConfig::default()).unwrap();
//! let prediction = predictor.predict(&history, 24).unwrap().applied().unwrap();
//! assert_eq!(prediction.forecast_values.first_period(), "2024-05".parse().ok());
//! ```

pub use forecast_engine as engine;
pub use forecast_math as math;

pub use forecast_engine::{AnalyticsConfig, ForecastAnalytics, ForecastError, Outcome, SkipReason};
pub use forecast_math::{MathError, PeriodKey, PeriodSeries};

/// Everything needed to drive the analytics from one import
pub mod prelude {
    pub use forecast_engine::prelude::*;
    pub use forecast_math::{
        calculate_trend, detect_seasonality, MathError, PeriodKey, PeriodSeries,
        SeasonalityResult, TrendDirection, TrendResult,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use chrono::NaiveDate;

    #[test]
    fn test_facade_drives_a_snapshot() {
        let mut forecast = Forecast::new("Rolling", 2025).rolling(Some(3));
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        forecast.add_version(ForecastVersion::new("", "V1", reference));
        let forecast_id = forecast.id.clone();
        let module = ForecastModule {
            forecasts: vec![forecast],
            ..Default::default()
        };

        let analytics = ForecastAnalytics::new(AnalyticsConfig::default()).unwrap();
        let snapshot = analytics
            .create_rolling_snapshot(&module, &forecast_id, "2025-01-31")
            .unwrap()
            .applied()
            .unwrap()
            .detail;

        assert_eq!(snapshot.period_end, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
        assert!(snapshot.data.is_empty());
    }

    #[test]
    fn test_math_reexports() {
        let key = crate::PeriodKey::new(2024, 12).unwrap();
        assert_eq!(key.add_months(1).to_string(), "2025-01");
        assert!(!detect_seasonality(&[1.0, 2.0, 3.0]).has_season);
    }
}
