//! Rolling forecast snapshots
//!
//! A snapshot is an owned copy of the active version's lines, so later edits
//! to the live lines never reach it. Snapshots are only ever appended.

use crate::config::AnalyticsConfig;
use crate::error::{ForecastError, Result};
use crate::model::{generate_id, Forecast, RollingForecastSnapshot};
use crate::outcome::{Outcome, SkipReason};
use chrono::{DateTime, Months, NaiveDate, Utc};
use tracing::debug;

/// Captures point-in-time copies of rolling forecasts
#[derive(Debug, Clone)]
pub struct RollingSnapshotManager {
    default_horizon_months: u32,
}

impl RollingSnapshotManager {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            default_horizon_months: config.rolling.default_horizon_months,
        })
    }

    /// Horizon of a forecast; unset or zero falls back to the configured default
    pub fn horizon_for(&self, forecast: &Forecast) -> u32 {
        forecast
            .rolling_horizon_months
            .filter(|&months| months > 0)
            .unwrap_or(self.default_horizon_months)
    }

    /// Build a snapshot of the forecast's active version without attaching it
    pub fn snapshot(
        &self,
        forecast: &Forecast,
        snapshot_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Outcome<RollingForecastSnapshot>> {
        if !forecast.is_rolling {
            return Ok(Outcome::Skipped(SkipReason::NotRolling));
        }
        let active = match forecast.active_version() {
            Some(version) => version,
            None => return Ok(Outcome::Skipped(SkipReason::NoActiveVersion)),
        };

        let horizon = self.horizon_for(forecast);
        let period_end = snapshot_date
            .checked_add_months(Months::new(horizon))
            .ok_or_else(|| {
                ForecastError::InvalidDate(format!(
                    "{} + {} months is out of range",
                    snapshot_date, horizon
                ))
            })?;

        Ok(Outcome::Applied(RollingForecastSnapshot {
            id: generate_id(),
            forecast_id: forecast.id.clone(),
            snapshot_date,
            period_start: snapshot_date,
            period_end,
            data: active.lines.clone(),
            created_at,
        }))
    }

    /// Return a copy of `forecast` with a new snapshot appended
    ///
    /// Also records `snapshot_date` as the forecast's last update date.
    pub fn create_snapshot(
        &self,
        forecast: &Forecast,
        snapshot_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Outcome<Forecast>> {
        let snapshot = match self.snapshot(forecast, snapshot_date, created_at)? {
            Outcome::Applied(snapshot) => snapshot,
            Outcome::Skipped(reason) => {
                debug!(forecast_id = %forecast.id, %reason, "snapshot skipped");
                return Ok(Outcome::Skipped(reason));
            }
        };

        debug!(
            forecast_id = %forecast.id,
            lines = snapshot.data.len(),
            period_end = %snapshot.period_end,
            "captured rolling snapshot"
        );

        Ok(Outcome::Applied(self.attach(forecast, snapshot)))
    }

    /// Return a copy of `forecast` with `snapshot` appended
    ///
    /// The snapshot date becomes the forecast's last update date.
    pub fn attach(&self, forecast: &Forecast, snapshot: RollingForecastSnapshot) -> Forecast {
        let mut updated = forecast.clone();
        updated.last_update_date = Some(snapshot.snapshot_date);
        updated.updated_at = snapshot.created_at;
        updated.rolling_snapshots.push(snapshot);
        updated
    }
}
