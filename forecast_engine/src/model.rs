//! Forecast data model
//!
//! Plain serde types mirroring the persisted forecast module. The analytics
//! services only ever read these and return replaced copies; storage belongs
//! to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use forecast_math::{PeriodKey, PeriodSeries, TrendDirection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Actual values supplied by the caller: account code to period series
///
/// Values are taken as clean numbers; validation of imported data happens
/// before it reaches this map.
pub type ActualData = BTreeMap<String, PeriodSeries>;

pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// How a line's forecast values were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    #[default]
    Manual,
    CopyActual,
    DriverBased,
    MlPrediction,
    Trend,
    Seasonal,
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ForecastMethod::Manual => "manual",
            ForecastMethod::CopyActual => "copy_actual",
            ForecastMethod::DriverBased => "driver_based",
            ForecastMethod::MlPrediction => "ml_prediction",
            ForecastMethod::Trend => "trend",
            ForecastMethod::Seasonal => "seasonal",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStatus {
    #[default]
    Draft,
    Submitted,
    Validated,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastType {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MlMethod {
    Arima,
    #[default]
    Trend,
    Seasonal,
    Hybrid,
}

/// Per-forecast prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlConfig {
    pub enabled: bool,
    pub method: MlMethod,
    pub lookback_months: usize,
    pub confidence_level: f64,
}

/// Business driver with historical and forecast values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDriver {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub historical_values: PeriodSeries,
    #[serde(default)]
    pub forecast_values: PeriodSeries,
}

/// Reference from a line to a driver formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDriver {
    pub driver_id: String,
    pub formula: String,
}

/// Output block of a prediction run, replaced wholesale on every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlPrediction {
    /// Heuristic score in 0-100, not a statistical probability
    pub confidence: u8,
    pub lower_bound: PeriodSeries,
    pub upper_bound: PeriodSeries,
    pub seasonality_detected: bool,
    pub trend: TrendDirection,
}

/// One account to forecast and reconcile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastLine {
    pub id: String,
    pub account_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_label: Option<String>,
    #[serde(default)]
    pub method: ForecastMethod,
    #[serde(default)]
    pub forecast_values: PeriodSeries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_values: Option<PeriodSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drivers: Vec<LineDriver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_prediction: Option<MlPrediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ForecastLine {
    /// Create a manual line for an account with no values
    pub fn new(account_code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            account_code: account_code.into(),
            account_label: None,
            method: ForecastMethod::Manual,
            forecast_values: PeriodSeries::new(),
            actual_values: None,
            drivers: Vec::new(),
            ml_prediction: None,
            comment: None,
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.account_label = Some(label.into());
        self
    }

    pub fn with_forecast_values(mut self, values: PeriodSeries) -> Self {
        self.forecast_values = values;
        self
    }

    pub fn with_actual_values(mut self, values: PeriodSeries) -> Self {
        self.actual_values = Some(values);
        self
    }
}

/// One revision of a forecast's lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastVersion {
    pub id: String,
    pub forecast_id: String,
    pub version_number: u32,
    pub name: String,
    pub reference_date: NaiveDate,
    #[serde(default)]
    pub status: ForecastStatus,
    #[serde(default)]
    pub lines: Vec<ForecastLine>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ForecastVersion {
    pub fn new(forecast_id: impl Into<String>, name: impl Into<String>, reference_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            forecast_id: forecast_id.into(),
            version_number: 1,
            name: name.into(),
            reference_date,
            status: ForecastStatus::Draft,
            lines: Vec::new(),
            is_active: false,
            submitted_by: None,
            validated_by: None,
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_lines(mut self, lines: Vec<ForecastLine>) -> Self {
        self.lines = lines;
        self
    }

    pub fn line(&self, line_id: &str) -> Option<&ForecastLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn line_mut(&mut self, line_id: &str) -> Option<&mut ForecastLine> {
        self.lines.iter_mut().find(|l| l.id == line_id)
    }
}

/// Immutable copy of a version's lines at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingForecastSnapshot {
    pub id: String,
    pub forecast_id: String,
    pub snapshot_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub data: Vec<ForecastLine>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A forecast with its versions, drivers and rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub forecast_type: ForecastType,
    pub fiscal_year: i32,
    #[serde(default)]
    pub chart_of_accounts_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_calendar_id: Option<String>,
    #[serde(default)]
    pub is_rolling: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_horizon_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<NaiveDate>,
    #[serde(default)]
    pub drivers: Vec<ForecastDriver>,
    #[serde(default)]
    pub versions: Vec<ForecastVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_version_id: Option<String>,
    #[serde(default)]
    pub rolling_snapshots: Vec<RollingForecastSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_config: Option<MlConfig>,
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Forecast {
    pub fn new(name: impl Into<String>, fiscal_year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            forecast_type: ForecastType::Monthly,
            fiscal_year,
            chart_of_accounts_id: String::new(),
            fiscal_calendar_id: None,
            is_rolling: false,
            rolling_horizon_months: None,
            auto_update_enabled: None,
            last_update_date: None,
            drivers: Vec::new(),
            versions: Vec::new(),
            active_version_id: None,
            rolling_snapshots: Vec::new(),
            ml_config: None,
            owner: String::new(),
            validators: Vec::new(),
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the forecast as rolling with an optional horizon override
    pub fn rolling(mut self, horizon_months: Option<u32>) -> Self {
        self.is_rolling = true;
        self.rolling_horizon_months = horizon_months;
        self
    }

    /// Append a version; the first version added becomes the active one
    pub fn add_version(&mut self, mut version: ForecastVersion) -> &ForecastVersion {
        version.forecast_id = self.id.clone();
        version.version_number = self.versions.len() as u32 + 1;
        if self.versions.is_empty() {
            version.is_active = true;
            self.active_version_id = Some(version.id.clone());
        }
        let index = self.versions.len();
        self.versions.push(version);
        &self.versions[index]
    }

    pub fn version(&self, version_id: &str) -> Option<&ForecastVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    pub fn version_mut(&mut self, version_id: &str) -> Option<&mut ForecastVersion> {
        self.versions.iter_mut().find(|v| v.id == version_id)
    }

    pub fn active_version(&self) -> Option<&ForecastVersion> {
        self.active_version_id
            .as_deref()
            .and_then(|id| self.version(id))
    }
}

/// Per-period comparison of a forecast value against the actual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastVarianceAnalysis {
    pub account_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_label: Option<String>,
    pub period: PeriodKey,
    pub forecast_value: f64,
    pub actual_value: f64,
    /// actual - forecast
    pub variance: f64,
    /// 0 when the forecast value is 0
    pub variance_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of one reconciliation run; never modified after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReconciliationReport {
    pub id: String,
    pub name: String,
    pub forecast_id: String,
    pub forecast_version_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub variances: Vec<ForecastVarianceAnalysis>,
    pub total_forecast: f64,
    pub total_actual: f64,
    pub total_variance: f64,
    pub total_variance_percent: f64,
    pub mape: f64,
    pub rmse: f64,
    pub accuracy_score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// The whole forecasting state handed to the analytics services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastModule {
    #[serde(default)]
    pub forecasts: Vec<Forecast>,
    #[serde(default)]
    pub reconciliation_reports: Vec<ForecastReconciliationReport>,
}

impl ForecastModule {
    pub fn forecast(&self, forecast_id: &str) -> Option<&Forecast> {
        self.forecasts.iter().find(|f| f.id == forecast_id)
    }

    pub fn forecast_mut(&mut self, forecast_id: &str) -> Option<&mut Forecast> {
        self.forecasts.iter_mut().find(|f| f.id == forecast_id)
    }

    /// Reports created for a forecast, oldest first
    pub fn reports_for<'a>(
        &'a self,
        forecast_id: &'a str,
    ) -> impl Iterator<Item = &'a ForecastReconciliationReport> + 'a {
        self.reconciliation_reports
            .iter()
            .filter(move |r| r.forecast_id == forecast_id)
    }
}
