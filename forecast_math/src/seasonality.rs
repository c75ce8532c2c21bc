//! Monthly seasonality detection
//!
//! A single fixed-lag heuristic: the lag-12 autocorrelation of the series is
//! compared against a threshold. Quarterly, weekly or multi-year cycles are
//! not detected.

use crate::stats;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Lag (and reported period) of the monthly seasonality test
pub const SEASONAL_LAG: usize = 12;

/// Default minimum series length: two full years
pub const DEFAULT_MIN_OBSERVATIONS: usize = 24;

/// Default autocorrelation above which a season is reported
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Outcome of a seasonality test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalityResult {
    pub has_season: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
}

impl SeasonalityResult {
    fn none() -> Self {
        Self {
            has_season: false,
            period: None,
        }
    }
}

/// Autocorrelation of `values` at `lag`, normalized by the population variance
///
/// Returns `None` when the series is not longer than the lag or is flat.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    let n = values.len();
    if n <= lag {
        return None;
    }

    let mean = stats::mean(values);
    let variance = stats::population_variance(values);
    if variance == 0.0 || !variance.is_finite() {
        return None;
    }

    let covariance: f64 = values
        .iter()
        .zip(values.iter().skip(lag))
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum();

    Some(covariance / ((n - lag) as f64 * variance))
}

/// Lag-12 autocorrelation seasonality detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalityDetector {
    min_observations: usize,
    threshold: f64,
}

impl Default for SeasonalityDetector {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SeasonalityDetector {
    /// Create a detector with a custom length floor and autocorrelation threshold
    pub fn new(min_observations: usize, threshold: f64) -> Result<Self> {
        if min_observations <= SEASONAL_LAG {
            return Err(MathError::InvalidInput(format!(
                "Minimum observations must exceed the seasonal lag of {}",
                SEASONAL_LAG
            )));
        }
        if !threshold.is_finite() {
            return Err(MathError::InvalidInput(
                "Seasonality threshold must be finite".to_string(),
            ));
        }

        Ok(Self {
            min_observations,
            threshold,
        })
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Test `values` for a 12-period cycle
    ///
    /// Series shorter than the floor never report a season, whatever their content.
    pub fn detect(&self, values: &[f64]) -> SeasonalityResult {
        if values.len() < self.min_observations {
            return SeasonalityResult::none();
        }

        match autocorrelation(values, SEASONAL_LAG) {
            Some(autocorr) if autocorr > self.threshold => SeasonalityResult {
                has_season: true,
                period: Some(SEASONAL_LAG),
            },
            _ => SeasonalityResult::none(),
        }
    }
}

/// Run the default detector over `values`
pub fn detect_seasonality(values: &[f64]) -> SeasonalityResult {
    SeasonalityDetector::default().detect(values)
}
