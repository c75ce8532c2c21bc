//! Analytics configuration
//!
//! Every knob defaults to the value the forecasting pipeline has always used,
//! so `AnalyticsConfig::default()` reproduces the standard behavior. A JSON
//! document only needs to name the fields it overrides.

use crate::error::{ForecastError, Result};
use forecast_math::seasonality::{DEFAULT_MIN_OBSERVATIONS, DEFAULT_THRESHOLD, SEASONAL_LAG};
use forecast_math::trend::DEFAULT_STABLE_RATIO;
use forecast_math::{SeasonalityDetector, TrendAnalyzer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration for the analytics services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub trend: TrendConfig,
    pub seasonality: SeasonalityConfig,
    pub prediction: PredictionConfig,
    pub reconciliation: ReconciliationConfig,
    pub rolling: RollingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrendConfig {
    /// Slopes below `mean * stable_ratio` in magnitude are "stable"
    pub stable_ratio: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_ratio: DEFAULT_STABLE_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeasonalityConfig {
    /// Series shorter than this never report a season
    pub min_observations: usize,
    /// Lag-12 autocorrelation above which a season is reported
    pub threshold: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PredictionConfig {
    /// Number of future periods generated per run
    pub horizon_periods: usize,
    /// Fewest historical values a prediction will run on
    pub min_history: usize,
    /// Lookback used when neither the caller nor the forecast names one
    pub default_lookback_months: usize,
    /// Half-width of the confidence band in standard deviations
    pub z_score: f64,
    /// Confidence reported when a season was detected
    pub seasonal_confidence: u8,
    /// Confidence reported otherwise
    pub base_confidence: u8,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon_periods: 12,
            min_history: 3,
            default_lookback_months: 24,
            z_score: 1.96,
            seasonal_confidence: 75,
            base_confidence: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconciliationConfig {
    /// Absolute variance a period must exceed to produce a variance row
    pub variance_tolerance: f64,
    /// MAPE above which precision is flagged
    pub mape_threshold: f64,
    /// Row variance percent above which an account deviation is flagged
    pub large_deviation_percent: f64,
    /// Relative global variance above which assumptions are flagged
    pub global_variance_ratio: f64,
    /// Length of the report window after the version's reference date
    pub report_window_months: u32,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            variance_tolerance: 0.01,
            mape_threshold: 20.0,
            large_deviation_percent: 50.0,
            global_variance_ratio: 0.15,
            report_window_months: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollingConfig {
    /// Horizon used for forecasts that do not set their own
    pub default_horizon_months: u32,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            default_horizon_months: 12,
        }
    }
}

impl AnalyticsConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check every value is usable by the analytics services
    pub fn validate(&self) -> Result<()> {
        check_non_negative("trend.stableRatio", self.trend.stable_ratio)?;

        if self.seasonality.min_observations <= SEASONAL_LAG {
            return Err(ForecastError::ConfigError(format!(
                "seasonality.minObservations must exceed {}",
                SEASONAL_LAG
            )));
        }
        check_finite("seasonality.threshold", self.seasonality.threshold)?;

        let prediction = &self.prediction;
        if prediction.horizon_periods == 0 {
            return Err(ForecastError::ConfigError(
                "prediction.horizonPeriods must be positive".to_string(),
            ));
        }
        if prediction.min_history == 0 {
            return Err(ForecastError::ConfigError(
                "prediction.minHistory must be at least 1".to_string(),
            ));
        }
        if prediction.default_lookback_months < prediction.min_history {
            return Err(ForecastError::ConfigError(
                "prediction.defaultLookbackMonths must not be below minHistory".to_string(),
            ));
        }
        check_non_negative("prediction.zScore", prediction.z_score)?;
        if prediction.seasonal_confidence > 100 || prediction.base_confidence > 100 {
            return Err(ForecastError::ConfigError(
                "prediction confidence scores must be within 0-100".to_string(),
            ));
        }

        let reconciliation = &self.reconciliation;
        check_non_negative(
            "reconciliation.varianceTolerance",
            reconciliation.variance_tolerance,
        )?;
        check_non_negative("reconciliation.mapeThreshold", reconciliation.mape_threshold)?;
        check_non_negative(
            "reconciliation.largeDeviationPercent",
            reconciliation.large_deviation_percent,
        )?;
        check_non_negative(
            "reconciliation.globalVarianceRatio",
            reconciliation.global_variance_ratio,
        )?;

        Ok(())
    }

    pub(crate) fn trend_analyzer(&self) -> Result<TrendAnalyzer> {
        Ok(TrendAnalyzer::new(self.trend.stable_ratio)?)
    }

    pub(crate) fn seasonality_detector(&self) -> Result<SeasonalityDetector> {
        Ok(SeasonalityDetector::new(
            self.seasonality.min_observations,
            self.seasonality.threshold,
        )?)
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ForecastError::ConfigError(format!(
            "{} must be a finite number",
            name
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(ForecastError::ConfigError(format!(
            "{} must not be negative",
            name
        )));
    }
    Ok(())
}
