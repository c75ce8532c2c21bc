//! Collaborator-facing analytics service
//!
//! [`ForecastAnalytics`] takes a snapshot of the forecast module, computes,
//! and returns a whole replaced module. It holds no state between calls, so
//! calls on different lines never interfere; two calls on the same line must
//! be serialized by whoever owns the module.

use crate::config::AnalyticsConfig;
use crate::error::{ForecastError, Result};
use crate::model::{
    ActualData, Forecast, ForecastModule, ForecastReconciliationReport,
    ForecastVersion, RollingForecastSnapshot,
};
use crate::outcome::{ModuleUpdate, Outcome, SkipReason};
use crate::prediction::{Prediction, PredictionGenerator};
use crate::reconciliation::ReconciliationEngine;
use crate::rolling::RollingSnapshotManager;
use chrono::{NaiveDate, Utc};
use forecast_math::{SeasonalityDetector, SeasonalityResult, TrendAnalyzer, TrendResult};
use tracing::{debug, info, warn};

/// Per-line results of a version-wide prediction run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionPredictions {
    /// Ids of the lines that received a prediction
    pub generated: Vec<String>,
    /// Ids of the lines left unchanged, with the reason
    pub skipped: Vec<(String, SkipReason)>,
}

/// The analytics operations exposed to the forecast state manager
#[derive(Debug, Clone)]
pub struct ForecastAnalytics {
    config: AnalyticsConfig,
    trend: TrendAnalyzer,
    seasonality: SeasonalityDetector,
    predictor: PredictionGenerator,
    reconciler: ReconciliationEngine,
    snapshots: RollingSnapshotManager,
}

impl ForecastAnalytics {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            trend: config.trend_analyzer()?,
            seasonality: config.seasonality_detector()?,
            predictor: PredictionGenerator::new(&config)?,
            reconciler: ReconciliationEngine::new(&config)?,
            snapshots: RollingSnapshotManager::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn predictor(&self) -> &PredictionGenerator {
        &self.predictor
    }

    pub fn reconciler(&self) -> &ReconciliationEngine {
        &self.reconciler
    }

    pub fn snapshot_manager(&self) -> &RollingSnapshotManager {
        &self.snapshots
    }

    /// Lag-12 seasonality test with the configured floor and threshold
    pub fn detect_seasonality(&self, values: &[f64]) -> SeasonalityResult {
        self.seasonality.detect(values)
    }

    /// Least-squares trend with the configured stable threshold
    pub fn calculate_trend(&self, values: &[f64]) -> Result<TrendResult> {
        Ok(self.trend.analyze(values)?)
    }

    /// Predict the next periods of one line from its trailing actuals
    ///
    /// A lookback of 0 is rejected with [`ForecastError::InvalidParameter`]
    /// rather than read as "the whole history"; pass the history length to
    /// use every actual.
    pub fn generate_predictions(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        version_id: &str,
        line_id: &str,
        lookback_months: usize,
    ) -> Result<Outcome<ModuleUpdate<Prediction>>> {
        check_lookback(lookback_months)?;
        let (_, version) = locate_version(module, forecast_id, version_id)?;
        let line = version.line(line_id).ok_or_else(|| {
            warn!(version_id, line_id, "unknown forecast line");
            ForecastError::LineNotFound {
                version_id: version_id.to_string(),
                line_id: line_id.to_string(),
            }
        })?;

        let now = Utc::now();
        let generated = match self.predictor.apply(line, lookback_months, now)? {
            Outcome::Applied(generated) => generated,
            Outcome::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
        };

        let mut module = module.clone();
        if let Some(version) = version_mut(&mut module, forecast_id, version_id) {
            if let Some(slot) = version.line_mut(line_id) {
                *slot = generated.line;
            }
        }
        touch(&mut module, forecast_id, version_id);

        debug!(forecast_id, version_id, line_id, "line prediction applied");
        Ok(Outcome::Applied(ModuleUpdate {
            module,
            detail: generated.prediction,
        }))
    }

    /// Predict every line of a version in one update
    ///
    /// Without an explicit lookback the forecast's own setting is used, then the
    /// configured default.
    pub fn generate_version_predictions(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        version_id: &str,
        lookback_months: Option<usize>,
    ) -> Result<Outcome<ModuleUpdate<VersionPredictions>>> {
        let (forecast, version) = locate_version(module, forecast_id, version_id)?;
        let lookback = lookback_months
            .or_else(|| {
                forecast
                    .ml_config
                    .as_ref()
                    .map(|ml| ml.lookback_months)
                    .filter(|&months| months > 0)
            })
            .unwrap_or(self.config.prediction.default_lookback_months);
        check_lookback(lookback)?;

        let now = Utc::now();
        let mut summary = VersionPredictions::default();
        let mut lines = Vec::with_capacity(version.lines.len());

        for line in &version.lines {
            match self.predictor.apply(line, lookback, now)? {
                Outcome::Applied(generated) => {
                    summary.generated.push(line.id.clone());
                    lines.push(generated.line);
                }
                Outcome::Skipped(reason) => {
                    summary.skipped.push((line.id.clone(), reason));
                    lines.push(line.clone());
                }
            }
        }

        if summary.generated.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::NothingGenerated));
        }

        let mut module = module.clone();
        if let Some(version) = version_mut(&mut module, forecast_id, version_id) {
            version.lines = lines;
        }
        touch(&mut module, forecast_id, version_id);

        info!(
            forecast_id,
            version_id,
            generated = summary.generated.len(),
            skipped = summary.skipped.len(),
            "version predictions applied"
        );
        Ok(Outcome::Applied(ModuleUpdate {
            module,
            detail: summary,
        }))
    }

    /// Reconcile a version against actuals and append the report to the module
    pub fn create_reconciliation_report(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        version_id: &str,
        actuals: &ActualData,
    ) -> Result<ModuleUpdate<ForecastReconciliationReport>> {
        let (forecast, version) = locate_version(module, forecast_id, version_id)?;
        let report = self
            .reconciler
            .reconcile(&forecast.id, version, actuals, Utc::now())?;

        info!(
            forecast_id,
            version_id,
            report_id = %report.id,
            rows = report.variances.len(),
            mape = report.mape,
            "reconciliation report created"
        );

        let mut module = module.clone();
        module.reconciliation_reports.push(report.clone());
        Ok(ModuleUpdate {
            module,
            detail: report,
        })
    }

    /// Snapshot a rolling forecast's active version at an ISO date (`YYYY-MM-DD`)
    pub fn create_rolling_snapshot(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        snapshot_date: &str,
    ) -> Result<Outcome<ModuleUpdate<RollingForecastSnapshot>>> {
        let date: NaiveDate = snapshot_date.parse()?;
        self.create_rolling_snapshot_on(module, forecast_id, date)
    }

    /// Snapshot a rolling forecast's active version at `snapshot_date`
    pub fn create_rolling_snapshot_on(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        snapshot_date: NaiveDate,
    ) -> Result<Outcome<ModuleUpdate<RollingForecastSnapshot>>> {
        let forecast = locate_forecast(module, forecast_id)?;
        let snapshot = match self
            .snapshots
            .snapshot(forecast, snapshot_date, Utc::now())?
        {
            Outcome::Applied(snapshot) => snapshot,
            Outcome::Skipped(reason) => {
                debug!(forecast_id, %reason, "snapshot skipped");
                return Ok(Outcome::Skipped(reason));
            }
        };
        let updated = self.snapshots.attach(forecast, snapshot.clone());

        info!(
            forecast_id,
            snapshot_id = %snapshot.id,
            %snapshot_date,
            "rolling snapshot created"
        );

        let mut module = module.clone();
        if let Some(slot) = module.forecast_mut(forecast_id) {
            *slot = updated;
        }
        Ok(Outcome::Applied(ModuleUpdate {
            module,
            detail: snapshot,
        }))
    }

    /// Snapshot a rolling forecast as of today (UTC)
    pub fn refresh_rolling_forecast(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
    ) -> Result<Outcome<ModuleUpdate<RollingForecastSnapshot>>> {
        self.create_rolling_snapshot_on(module, forecast_id, Utc::now().date_naive())
    }

    /// Seed every line of a version with its account's actuals
    ///
    /// Lines whose account has no actuals end up with empty value maps. The
    /// line method is left as it was. The detail is the number of lines that
    /// received at least one value.
    pub fn copy_actual_to_forecast(
        &self,
        module: &ForecastModule,
        forecast_id: &str,
        version_id: &str,
        actuals: &ActualData,
    ) -> Result<ModuleUpdate<usize>> {
        locate_version(module, forecast_id, version_id)?;

        let now = Utc::now();
        let mut module = module.clone();
        let mut seeded = 0;
        if let Some(version) = version_mut(&mut module, forecast_id, version_id) {
            for line in &mut version.lines {
                let values = actuals
                    .get(&line.account_code)
                    .cloned()
                    .unwrap_or_default();
                if !values.is_empty() {
                    seeded += 1;
                }
                line.forecast_values = values.clone();
                line.actual_values = Some(values);
                line.updated_at = now;
            }
        }
        touch(&mut module, forecast_id, version_id);

        debug!(forecast_id, version_id, seeded, "actuals copied to forecast");
        Ok(ModuleUpdate {
            module,
            detail: seeded,
        })
    }

    /// Reports created for a forecast, oldest first
    pub fn reconciliation_reports<'a>(
        &self,
        module: &'a ForecastModule,
        forecast_id: &str,
    ) -> Vec<&'a ForecastReconciliationReport> {
        module
            .reconciliation_reports
            .iter()
            .filter(|r| r.forecast_id == forecast_id)
            .collect()
    }

    /// Snapshots of a forecast; empty for an unknown id
    pub fn rolling_snapshots<'a>(
        &self,
        module: &'a ForecastModule,
        forecast_id: &str,
    ) -> &'a [RollingForecastSnapshot] {
        module
            .forecast(forecast_id)
            .map(|f| f.rolling_snapshots.as_slice())
            .unwrap_or(&[])
    }
}

fn check_lookback(lookback_months: usize) -> Result<()> {
    if lookback_months == 0 {
        return Err(ForecastError::InvalidParameter(
            "Lookback must cover at least one month".to_string(),
        ));
    }
    Ok(())
}

fn locate_forecast<'a>(module: &'a ForecastModule, forecast_id: &str) -> Result<&'a Forecast> {
    module.forecast(forecast_id).ok_or_else(|| {
        warn!(forecast_id, "unknown forecast");
        ForecastError::ForecastNotFound(forecast_id.to_string())
    })
}

fn locate_version<'a>(
    module: &'a ForecastModule,
    forecast_id: &str,
    version_id: &str,
) -> Result<(&'a Forecast, &'a ForecastVersion)> {
    let forecast = locate_forecast(module, forecast_id)?;
    let version = forecast.version(version_id).ok_or_else(|| {
        warn!(forecast_id, version_id, "unknown forecast version");
        ForecastError::VersionNotFound {
            forecast_id: forecast_id.to_string(),
            version_id: version_id.to_string(),
        }
    })?;
    Ok((forecast, version))
}

fn version_mut<'a>(
    module: &'a mut ForecastModule,
    forecast_id: &str,
    version_id: &str,
) -> Option<&'a mut ForecastVersion> {
    module
        .forecast_mut(forecast_id)
        .and_then(|f| f.version_mut(version_id))
}

/// Bump the modification time of a version and its forecast
fn touch(module: &mut ForecastModule, forecast_id: &str, version_id: &str) {
    let now = Utc::now();
    if let Some(forecast) = module.forecast_mut(forecast_id) {
        forecast.updated_at = now;
        if let Some(version) = forecast.version_mut(version_id) {
            version.updated_at = now;
        }
    }
}
