//! Trend and seasonality based predictions for forecast lines
//!
//! The pipeline is fixed: a least-squares line is fitted over the trailing
//! lookback window of actuals, extrapolated over the horizon, optionally
//! scaled by a monthly seasonal factor, and wrapped in a band of
//! `z * stdDev` around each point.
//!
//! The band has the same width at every horizon step; it does not widen with
//! distance from the window.

use crate::config::{AnalyticsConfig, PredictionConfig};
use crate::error::Result;
use crate::model::{ForecastLine, ForecastMethod, MlPrediction};
use crate::outcome::{Outcome, SkipReason};
use chrono::{DateTime, Utc};
use forecast_math::{
    stats, PeriodKey, PeriodSeries, SeasonalityDetector, SeasonalityResult, TrendAnalyzer,
    TrendResult, SEASONAL_LAG,
};
use tracing::debug;

/// Everything computed by one prediction run
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Last period of the lookback window
    pub window_end: PeriodKey,
    pub window_len: usize,
    pub trend: TrendResult,
    pub seasonality: SeasonalityResult,
    pub mean: f64,
    pub std_dev: f64,
    /// Predicted values for the horizon periods only
    pub forecast_values: PeriodSeries,
    pub ml_prediction: MlPrediction,
}

/// A line with a prediction merged in
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrediction {
    pub line: ForecastLine,
    pub prediction: Prediction,
}

/// Extrapolates future periods from a window of actuals
#[derive(Debug, Clone)]
pub struct PredictionGenerator {
    config: PredictionConfig,
    trend: TrendAnalyzer,
    seasonality: SeasonalityDetector,
}

impl PredictionGenerator {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: config.prediction.clone(),
            trend: config.trend_analyzer()?,
            seasonality: config.seasonality_detector()?,
        })
    }

    pub fn horizon(&self) -> usize {
        self.config.horizon_periods
    }

    /// Predict the periods following the last `lookback_months` actuals
    pub fn predict(&self, actuals: &PeriodSeries, lookback_months: usize) -> Result<Outcome<Prediction>> {
        let window = actuals.tail(lookback_months);
        let values = window.values();

        if values.len() < self.config.min_history {
            return Ok(Outcome::Skipped(SkipReason::InsufficientHistory {
                available: values.len(),
                required: self.config.min_history,
            }));
        }
        let window_end = match window.last_period() {
            Some(period) => period,
            None => return Ok(Outcome::Skipped(SkipReason::NoActuals)),
        };

        let seasonality = self.seasonality.detect(&values);
        let trend = self.trend.analyze(&values)?;
        let mean = stats::mean(&values);
        let std_dev = stats::population_std_dev(&values);
        let margin = self.config.z_score * std_dev;
        let n = values.len();

        let mut forecast_values = PeriodSeries::new();
        let mut lower_bound = PeriodSeries::new();
        let mut upper_bound = PeriodSeries::new();

        for step in 1..=self.config.horizon_periods {
            let period = window_end.add_months(step as i32);
            // The line is evaluated at n + step, one index past the natural continuation
            let mut point = trend.value_at((n + step) as f64);

            if seasonality.has_season {
                let season_length = seasonality.period.unwrap_or(SEASONAL_LAG);
                let seasonal_index = (n + step - 1) % season_length;
                // A zero month carries no seasonal signal and falls back to the mean
                let seasonal_value = values
                    .get(seasonal_index)
                    .copied()
                    .filter(|&value| value != 0.0)
                    .unwrap_or(mean);
                let factor = if mean != 0.0 { seasonal_value / mean } else { 1.0 };
                point *= factor;
            }

            forecast_values.insert(period, point);
            lower_bound.insert(period, point - margin);
            upper_bound.insert(period, point + margin);
        }

        let confidence = if seasonality.has_season {
            self.config.seasonal_confidence
        } else {
            self.config.base_confidence
        };

        debug!(
            window_len = n,
            slope = trend.slope,
            trend = %trend.trend,
            seasonal = seasonality.has_season,
            std_dev,
            "generated prediction"
        );

        Ok(Outcome::Applied(Prediction {
            window_end,
            window_len: n,
            trend,
            seasonality,
            mean,
            std_dev,
            ml_prediction: MlPrediction {
                confidence,
                lower_bound,
                upper_bound,
                seasonality_detected: seasonality.has_season,
                trend: trend.trend,
            },
            forecast_values,
        }))
    }

    /// Produce a copy of `line` with predictions merged into its forecast values
    ///
    /// Existing forecast values outside the horizon are kept, colliding ones are
    /// overwritten, the method becomes `ml_prediction` and the prediction block
    /// is replaced. The input line is never modified.
    pub fn apply(
        &self,
        line: &ForecastLine,
        lookback_months: usize,
        now: DateTime<Utc>,
    ) -> Result<Outcome<LinePrediction>> {
        let actuals = match &line.actual_values {
            Some(actuals) => actuals,
            None => {
                debug!(line_id = %line.id, account = %line.account_code, "no actuals, prediction skipped");
                return Ok(Outcome::Skipped(SkipReason::NoActuals));
            }
        };

        let prediction = match self.predict(actuals, lookback_months)? {
            Outcome::Applied(prediction) => prediction,
            Outcome::Skipped(reason) => {
                debug!(line_id = %line.id, account = %line.account_code, %reason, "prediction skipped");
                return Ok(Outcome::Skipped(reason));
            }
        };

        let mut updated = line.clone();
        updated.forecast_values.merge(&prediction.forecast_values);
        updated.method = ForecastMethod::MlPrediction;
        updated.ml_prediction = Some(prediction.ml_prediction.clone());
        updated.updated_at = now;

        Ok(Outcome::Applied(LinePrediction {
            line: updated,
            prediction,
        }))
    }
}
