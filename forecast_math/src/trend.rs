//! Linear trend extraction
//!
//! Fits an ordinary least-squares line over the index sequence `0..n-1`,
//! i.e. assuming equally spaced periods with no gap correction.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default ratio of the series mean under which a slope counts as flat
pub const DEFAULT_STABLE_RATIO: f64 = 0.01;

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Fitted line and its classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    pub trend: TrendDirection,
}

impl TrendResult {
    /// Evaluate the fitted line at index `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Coefficient of determination of the line over the values it was fitted on
    ///
    /// Returns `None` when the values have no spread to explain.
    pub fn r_squared(&self, values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }

        let y_mean = values.iter().sum::<f64>() / values.len() as f64;
        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;

        for (i, &y) in values.iter().enumerate() {
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - self.value_at(i as f64)).powi(2);
        }

        if ss_total.abs() < 1e-10 {
            return None;
        }

        Some(1.0 - ss_residual / ss_total)
    }
}

/// Least-squares trend analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalyzer {
    stable_ratio: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self {
            stable_ratio: DEFAULT_STABLE_RATIO,
        }
    }
}

impl TrendAnalyzer {
    /// Create an analyzer with a custom "stable" threshold ratio
    ///
    /// A slope is classified as stable when `|slope| < mean * stable_ratio`.
    /// The threshold is relative to the mean, so series whose mean is near or
    /// below zero are almost never classified as stable.
    pub fn new(stable_ratio: f64) -> Result<Self> {
        if !stable_ratio.is_finite() || stable_ratio < 0.0 {
            return Err(MathError::InvalidInput(
                "Stable ratio must be a finite, non-negative number".to_string(),
            ));
        }

        Ok(Self { stable_ratio })
    }

    pub fn stable_ratio(&self) -> f64 {
        self.stable_ratio
    }

    /// Fit the trend line over `values`
    pub fn analyze(&self, values: &[f64]) -> Result<TrendResult> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a trend to an empty series".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        // A single point has no spread along x
        let slope = if denominator != 0.0 {
            numerator / denominator
        } else {
            0.0
        };
        let intercept = y_mean - slope * x_mean;

        let trend = if slope.abs() < y_mean * self.stable_ratio {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        Ok(TrendResult {
            slope,
            intercept,
            trend,
        })
    }
}

/// Fit a trend with the default stable threshold
pub fn calculate_trend(values: &[f64]) -> Result<TrendResult> {
    TrendAnalyzer::default().analyze(values)
}
