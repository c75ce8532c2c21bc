//! Accuracy metrics over reconciliation variance rows

use crate::model::ForecastVarianceAnalysis;

/// Accuracy of a forecast against actuals
///
/// Both error measures are averaged over the emitted variance rows only, so a
/// period that matched within tolerance does not dilute them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccuracyMetrics {
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// `max(0, 100 - MAPE)`
    pub accuracy_score: f64,
    /// Number of rows the metrics were computed over
    pub rows: usize,
}

impl AccuracyMetrics {
    /// Compute metrics over variance rows; all zero (score 100) when there are none
    pub fn from_variances(variances: &[ForecastVarianceAnalysis]) -> Self {
        if variances.is_empty() {
            return Self {
                accuracy_score: 100.0,
                ..Self::default()
            };
        }

        let n = variances.len() as f64;
        let mape = variances
            .iter()
            .map(|v| v.variance_percent.abs())
            .sum::<f64>()
            / n;
        let mse = variances.iter().map(|v| v.variance.powi(2)).sum::<f64>() / n;

        Self {
            mape,
            rmse: mse.sqrt(),
            accuracy_score: (100.0 - mape).max(0.0),
            rows: variances.len(),
        }
    }
}

impl std::fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  Rows:     {}", self.rows)?;
        writeln!(f, "  MAPE:     {:.4}%", self.mape)?;
        writeln!(f, "  RMSE:     {:.4}", self.rmse)?;
        writeln!(f, "  Accuracy: {:.2}", self.accuracy_score)?;
        Ok(())
    }
}
