//! Forecast versus actual reconciliation
//!
//! For every line of a version the periods of its forecast values and of the
//! account's actuals are unioned; a side missing a period counts as 0. Totals
//! run over every unioned period, while variance rows (and the MAPE/RMSE
//! computed from them) only cover periods whose absolute variance exceeds the
//! tolerance.

use crate::config::{AnalyticsConfig, ReconciliationConfig};
use crate::error::{ForecastError, Result};
use crate::metrics::AccuracyMetrics;
use crate::model::{
    generate_id, ActualData, ForecastReconciliationReport, ForecastVarianceAnalysis,
    ForecastVersion,
};
use chrono::{DateTime, Months, NaiveDate, Utc};
use forecast_math::PeriodSeries;
use tracing::debug;

/// Rule-based advice attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    /// MAPE above the precision threshold
    ImprovePrecision,
    /// At least one row deviates by more than the large-deviation percent
    LargeAccountDeviations,
    /// Total actual differs from total forecast by more than the global ratio
    ReviewAssumptions,
}

impl Recommendation {
    /// Report text, quoting the threshold that triggered it
    pub fn message(&self, config: &ReconciliationConfig) -> String {
        match self {
            Recommendation::ImprovePrecision => format!(
                "Forecast precision needs improvement (MAPE > {}%)",
                percent_label(config.mape_threshold)
            ),
            Recommendation::LargeAccountDeviations => format!(
                "Some accounts show large deviations (> {}%)",
                percent_label(config.large_deviation_percent)
            ),
            Recommendation::ReviewAssumptions => format!(
                "Significant global variance (> {}%) - review assumptions",
                percent_label(config.global_variance_ratio * 100.0)
            ),
        }
    }
}

fn percent_label(value: f64) -> String {
    let label = format!("{:.2}", value);
    label.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Variance rows and totals of one version against actuals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarianceSummary {
    pub rows: Vec<ForecastVarianceAnalysis>,
    pub total_forecast: f64,
    pub total_actual: f64,
}

impl VarianceSummary {
    pub fn total_variance(&self) -> f64 {
        self.total_actual - self.total_forecast
    }

    /// Total variance relative to total forecast, in percent; 0 when nothing was forecast
    pub fn total_variance_percent(&self) -> f64 {
        if self.total_forecast != 0.0 {
            self.total_variance() / self.total_forecast * 100.0
        } else {
            0.0
        }
    }
}

/// Builds reconciliation reports for forecast versions
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.reconciliation.clone(),
        })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Compare every line of `version` against the actuals of its account
    pub fn variances(&self, version: &ForecastVersion, actuals: &ActualData) -> VarianceSummary {
        let empty = PeriodSeries::new();
        let mut summary = VarianceSummary::default();

        for line in &version.lines {
            let account_actuals = actuals.get(&line.account_code).unwrap_or(&empty);

            for period in line.forecast_values.union_keys(account_actuals) {
                let forecast_value = line.forecast_values.get_or_zero(&period);
                let actual_value = account_actuals.get_or_zero(&period);
                let variance = actual_value - forecast_value;
                let variance_percent = if forecast_value != 0.0 {
                    variance / forecast_value * 100.0
                } else {
                    0.0
                };

                summary.total_forecast += forecast_value;
                summary.total_actual += actual_value;

                if variance.abs() > self.config.variance_tolerance {
                    summary.rows.push(ForecastVarianceAnalysis {
                        account_code: line.account_code.clone(),
                        account_label: line.account_label.clone(),
                        period,
                        forecast_value,
                        actual_value,
                        variance,
                        variance_percent,
                        reason: None,
                    });
                }
            }
        }

        summary
    }

    /// Every rule that fires for these rows and totals, in fixed order
    pub fn recommendations(
        &self,
        summary: &VarianceSummary,
        metrics: &AccuracyMetrics,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if metrics.mape > self.config.mape_threshold {
            recommendations.push(Recommendation::ImprovePrecision);
        }
        if summary
            .rows
            .iter()
            .any(|row| row.variance_percent.abs() > self.config.large_deviation_percent)
        {
            recommendations.push(Recommendation::LargeAccountDeviations);
        }
        if summary.total_forecast != 0.0
            && (summary.total_variance() / summary.total_forecast).abs()
                > self.config.global_variance_ratio
        {
            recommendations.push(Recommendation::ReviewAssumptions);
        }

        recommendations
    }

    /// Window covered by a report on `version`
    ///
    /// Always the reference date plus the configured number of months, whatever
    /// span the actuals cover.
    pub fn report_window(&self, version: &ForecastVersion) -> Result<(NaiveDate, NaiveDate)> {
        let start = version.reference_date;
        let end = start
            .checked_add_months(Months::new(self.config.report_window_months))
            .ok_or_else(|| {
                ForecastError::InvalidDate(format!(
                    "{} + {} months is out of range",
                    start, self.config.report_window_months
                ))
            })?;
        Ok((start, end))
    }

    /// Build a report for `version` of forecast `forecast_id`
    pub fn reconcile(
        &self,
        forecast_id: &str,
        version: &ForecastVersion,
        actuals: &ActualData,
        created_at: DateTime<Utc>,
    ) -> Result<ForecastReconciliationReport> {
        let (period_start, period_end) = self.report_window(version)?;
        let summary = self.variances(version, actuals);
        let metrics = AccuracyMetrics::from_variances(&summary.rows);
        let recommendations = self
            .recommendations(&summary, &metrics)
            .iter()
            .map(|r| r.message(&self.config))
            .collect();

        debug!(
            version_id = %version.id,
            rows = summary.rows.len(),
            mape = metrics.mape,
            rmse = metrics.rmse,
            "reconciled version"
        );

        Ok(ForecastReconciliationReport {
            id: generate_id(),
            name: format!("Report {} - {}", version.name, created_at.format("%Y-%m-%d")),
            forecast_id: forecast_id.to_string(),
            forecast_version_id: version.id.clone(),
            period_start,
            period_end,
            total_forecast: summary.total_forecast,
            total_actual: summary.total_actual,
            total_variance: summary.total_variance(),
            total_variance_percent: summary.total_variance_percent(),
            variances: summary.rows,
            mape: metrics.mape,
            rmse: metrics.rmse,
            accuracy_score: metrics.accuracy_score,
            recommendations,
            created_at,
        })
    }
}
