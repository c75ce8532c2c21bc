#![allow(dead_code)]

use chrono::NaiveDate;
use forecast_engine::model::{
    ActualData, Forecast, ForecastLine, ForecastModule, ForecastVersion,
};
use forecast_math::{PeriodKey, PeriodSeries};

pub fn period(label: &str) -> PeriodKey {
    label.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn series(pairs: &[(&str, f64)]) -> PeriodSeries {
    PeriodSeries::parse_pairs(pairs.iter().copied()).unwrap()
}

/// 24 months from 2023-01 rising linearly from 1000 by 60 per month
pub fn linear_history() -> PeriodSeries {
    let values: Vec<f64> = (0..24).map(|i| 1000.0 + 60.0 * i as f64).collect();
    PeriodSeries::consecutive(period("2023-01"), &values)
}

/// 36 months from 2022-01 of `100 + 50 sin(2 pi i / 12)`
pub fn seasonal_history() -> PeriodSeries {
    let values: Vec<f64> = (0..36)
        .map(|i| 100.0 + 50.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
        .collect();
    PeriodSeries::consecutive(period("2022-01"), &values)
}

pub fn actual_data(entries: &[(&str, PeriodSeries)]) -> ActualData {
    entries
        .iter()
        .map(|(code, values)| (code.to_string(), values.clone()))
        .collect()
}

/// Ids of the objects in a fixture module
pub struct Fixture {
    pub module: ForecastModule,
    pub forecast_id: String,
    pub version_id: String,
    pub line_ids: Vec<String>,
}

/// A module holding one forecast with one active version made of `lines`
pub fn fixture(lines: Vec<ForecastLine>, rolling: bool) -> Fixture {
    let line_ids = lines.iter().map(|l| l.id.clone()).collect();
    let mut forecast = Forecast::new("Rolling FY", 2025);
    if rolling {
        forecast = forecast.rolling(None);
    }
    let version = ForecastVersion::new("", "Budget V1", date(2025, 1, 1)).with_lines(lines);
    let version_id = forecast.add_version(version).id.clone();
    let forecast_id = forecast.id.clone();

    Fixture {
        module: ForecastModule {
            forecasts: vec![forecast],
            reconciliation_reports: Vec::new(),
        },
        forecast_id,
        version_id,
        line_ids,
    }
}
