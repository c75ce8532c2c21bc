//! Walk a rolling forecast through prediction, reconciliation and a snapshot
//!
//! Run with `RUST_LOG=forecast_engine=debug` to see the service logs, and pass
//! a JSON file path to override the analytics configuration.

use chrono::NaiveDate;
use forecast_engine::prelude::*;
use forecast_math::{PeriodKey, PeriodSeries};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading configuration from: {}", path);
            AnalyticsConfig::from_json_file(path)?
        }
        None => AnalyticsConfig::default(),
    };
    let analytics = ForecastAnalytics::new(config)?;

    // Two years of monthly sales with a mild seasonal swing
    let start: PeriodKey = "2023-01".parse()?;
    let history: Vec<f64> = (0..24)
        .map(|i| {
            let season = (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            10_000.0 + 150.0 * i as f64 + 800.0 * season
        })
        .collect();

    let sales = ForecastLine::new("706000")
        .with_label("Sales of goods")
        .with_actual_values(PeriodSeries::consecutive(start, &history));
    let sales_id = sales.id.clone();

    let mut forecast = Forecast::new("Rolling FY2025", 2025).rolling(Some(12));
    let reference = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("invalid reference date")?;
    let version_id = forecast
        .add_version(ForecastVersion::new("", "Budget V1", reference).with_lines(vec![sales]))
        .id
        .clone();
    let forecast_id = forecast.id.clone();
    let mut state = ForecastModule {
        forecasts: vec![forecast],
        ..Default::default()
    };

    // Predict the next twelve months
    let outcome = analytics
        .generate_predictions(&state, &forecast_id, &version_id, &sales_id, 24)?
        .commit(|module| state = module);
    let prediction = match outcome {
        Outcome::Applied(prediction) => prediction,
        Outcome::Skipped(reason) => {
            println!("No prediction: {}", reason);
            return Ok(());
        }
    };

    println!(
        "Trend: {} (slope {:.2}), seasonal: {}, confidence: {}%",
        prediction.trend.trend,
        prediction.trend.slope,
        prediction.seasonality.has_season,
        prediction.ml_prediction.confidence
    );
    for (period, value) in &prediction.forecast_values {
        let lower = prediction.ml_prediction.lower_bound.get_or_zero(period);
        let upper = prediction.ml_prediction.upper_bound.get_or_zero(period);
        println!("{}: {:>10.2}  [{:.2} .. {:.2}]", period, value, lower, upper);
    }

    // Reconcile against the first quarter once it is closed
    let mut realised = PeriodSeries::new();
    for (period, value) in prediction.forecast_values.iter().take(3) {
        realised.insert(*period, value * 1.08);
    }
    let actuals: ActualData = [("706000".to_string(), realised)].into_iter().collect();
    let report = analytics
        .create_reconciliation_report(&state, &forecast_id, &version_id, &actuals)?
        .commit(|module| state = module);

    println!("\n{}", report.name);
    let metrics = AccuracyMetrics::from_variances(&report.variances);
    print!("{}", metrics);
    for recommendation in &report.recommendations {
        println!("- {}", recommendation);
    }

    // Freeze the forecast as it stood at the start of the second quarter
    if let Outcome::Applied(snapshot) = analytics
        .create_rolling_snapshot(&state, &forecast_id, "2025-04-01")?
        .commit(|module| state = module)
    {
        println!(
            "\nSnapshot {} covers {} to {} ({} lines)",
            snapshot.id,
            snapshot.period_start,
            snapshot.period_end,
            snapshot.data.len()
        );
    }

    println!(
        "Module now holds {} report(s) and {} snapshot(s)",
        state.reconciliation_reports.len(),
        analytics.rolling_snapshots(&state, &forecast_id).len()
    );

    Ok(())
}
