mod common;

use assert_approx_eq::assert_approx_eq;
use common::{actual_data, fixture, linear_history, period, seasonal_history, series};
use forecast_engine::error::ForecastError;
use forecast_engine::model::{ForecastLine, ForecastMethod, MlConfig, MlMethod};
use forecast_engine::outcome::SkipReason;
use forecast_engine::{AnalyticsConfig, ForecastAnalytics};
use forecast_math::TrendDirection;
use pretty_assertions::assert_eq;
use rstest::{fixture as rstest_fixture, rstest};

#[rstest_fixture]
fn analytics() -> ForecastAnalytics {
    ForecastAnalytics::new(AnalyticsConfig::default()).unwrap()
}

#[rstest]
fn test_invalid_config_is_rejected() {
    let mut config = AnalyticsConfig::default();
    config.prediction.horizon_periods = 0;
    assert!(matches!(
        ForecastAnalytics::new(config),
        Err(ForecastError::ConfigError(_))
    ));
}

#[rstest]
fn test_unknown_ids_are_errors(analytics: ForecastAnalytics) {
    let fx = fixture(vec![ForecastLine::new("706000")], false);

    let err = analytics
        .generate_predictions(&fx.module, "missing", &fx.version_id, &fx.line_ids[0], 24)
        .unwrap_err();
    assert!(matches!(err, ForecastError::ForecastNotFound(ref id) if id == "missing"));

    let err = analytics
        .generate_predictions(&fx.module, &fx.forecast_id, "missing", &fx.line_ids[0], 24)
        .unwrap_err();
    assert!(matches!(err, ForecastError::VersionNotFound { .. }));

    let err = analytics
        .generate_predictions(&fx.module, &fx.forecast_id, &fx.version_id, "missing", 24)
        .unwrap_err();
    assert!(matches!(err, ForecastError::LineNotFound { .. }));

    let err = analytics
        .create_reconciliation_report(&fx.module, &fx.forecast_id, "missing", &Default::default())
        .unwrap_err();
    assert!(matches!(err, ForecastError::VersionNotFound { .. }));

    let err = analytics
        .create_rolling_snapshot(&fx.module, "missing", "2025-01-01")
        .unwrap_err();
    assert!(matches!(err, ForecastError::ForecastNotFound(_)));
}

#[rstest]
fn test_zero_lookback_is_invalid(analytics: ForecastAnalytics) {
    let line = ForecastLine::new("706000").with_actual_values(linear_history());
    let fx = fixture(vec![line], false);

    let err = analytics
        .generate_predictions(&fx.module, &fx.forecast_id, &fx.version_id, &fx.line_ids[0], 0)
        .unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));

    let err = analytics
        .generate_version_predictions(&fx.module, &fx.forecast_id, &fx.version_id, Some(0))
        .unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}

#[rstest]
fn test_prediction_replaces_only_the_target_line(analytics: ForecastAnalytics) {
    let target = ForecastLine::new("706000").with_actual_values(linear_history());
    let other = ForecastLine::new("601000").with_forecast_values(series(&[("2025-01", 5.0)]));
    let fx = fixture(vec![target, other.clone()], false);

    let mut calls = 0;
    let mut committed = None;
    let prediction = analytics
        .generate_predictions(&fx.module, &fx.forecast_id, &fx.version_id, &fx.line_ids[0], 24)
        .unwrap()
        .commit(|module| {
            calls += 1;
            committed = Some(module);
        })
        .applied()
        .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(prediction.trend.trend, TrendDirection::Increasing);

    let module = committed.unwrap();
    let version = module
        .forecast(&fx.forecast_id)
        .and_then(|f| f.version(&fx.version_id))
        .unwrap();
    let line = version.line(&fx.line_ids[0]).unwrap();
    assert_eq!(line.method, ForecastMethod::MlPrediction);
    assert_approx_eq!(line.forecast_values.get(&period("2025-01")).unwrap(), 2500.0, 1e-6);
    assert_eq!(line.ml_prediction.as_ref(), Some(&prediction.ml_prediction));
    assert_eq!(version.line(&fx.line_ids[1]).unwrap(), &other);

    // The module passed in is untouched
    let original = fx.module.forecasts[0].version(&fx.version_id).unwrap();
    assert!(original.line(&fx.line_ids[0]).unwrap().ml_prediction.is_none());
}

#[rstest]
fn test_skipped_prediction_does_not_call_back(analytics: ForecastAnalytics) {
    let line = ForecastLine::new("706000").with_actual_values(series(&[
        ("2024-11", 10.0),
        ("2024-12", 12.0),
    ]));
    let fx = fixture(vec![line], false);

    let mut calls = 0;
    let outcome = analytics
        .generate_predictions(&fx.module, &fx.forecast_id, &fx.version_id, &fx.line_ids[0], 24)
        .unwrap()
        .commit(|_| calls += 1);

    assert_eq!(calls, 0);
    assert_eq!(
        outcome.skip_reason(),
        Some(SkipReason::InsufficientHistory {
            available: 2,
            required: 3
        })
    );
}

#[rstest]
fn test_version_predictions_report_each_line(analytics: ForecastAnalytics) {
    let lines = vec![
        ForecastLine::new("706000").with_actual_values(linear_history()),
        ForecastLine::new("601000"),
        ForecastLine::new("613000").with_actual_values(series(&[("2024-12", 1.0)])),
        ForecastLine::new("708000").with_actual_values(seasonal_history()),
    ];
    let fx = fixture(lines, false);

    let update = analytics
        .generate_version_predictions(&fx.module, &fx.forecast_id, &fx.version_id, None)
        .unwrap()
        .applied()
        .unwrap();

    let summary = &update.detail;
    assert_eq!(summary.generated, vec![fx.line_ids[0].clone(), fx.line_ids[3].clone()]);
    assert_eq!(
        summary.skipped,
        vec![
            (fx.line_ids[1].clone(), SkipReason::NoActuals),
            (
                fx.line_ids[2].clone(),
                SkipReason::InsufficientHistory {
                    available: 1,
                    required: 3
                }
            ),
        ]
    );

    let version = update.module.forecasts[0].version(&fx.version_id).unwrap();
    assert_eq!(version.lines.len(), 4);
    assert!(version.lines[0].ml_prediction.is_some());
    assert!(version.lines[1].ml_prediction.is_none());
    assert!(version.lines[3].ml_prediction.as_ref().unwrap().seasonality_detected);
}

#[rstest]
fn test_version_predictions_use_forecast_lookback(analytics: ForecastAnalytics) {
    let line = ForecastLine::new("708000").with_actual_values(seasonal_history());
    let mut fx = fixture(vec![line], false);
    fx.module.forecasts[0].ml_config = Some(MlConfig {
        enabled: true,
        method: MlMethod::Seasonal,
        lookback_months: 12,
        confidence_level: 0.95,
    });

    // Twelve months are below the seasonality floor
    let update = analytics
        .generate_version_predictions(&fx.module, &fx.forecast_id, &fx.version_id, None)
        .unwrap()
        .applied()
        .unwrap();
    let ml = update.module.forecasts[0].versions[0].lines[0]
        .ml_prediction
        .clone()
        .unwrap();
    assert!(!ml.seasonality_detected);
    assert_eq!(ml.confidence, 60);

    // An explicit lookback wins over the forecast setting
    let update = analytics
        .generate_version_predictions(&fx.module, &fx.forecast_id, &fx.version_id, Some(36))
        .unwrap()
        .applied()
        .unwrap();
    let ml = update.module.forecasts[0].versions[0].lines[0]
        .ml_prediction
        .clone()
        .unwrap();
    assert!(ml.seasonality_detected);
    assert_eq!(ml.confidence, 75);
}

#[rstest]
fn test_version_predictions_with_nothing_to_predict(analytics: ForecastAnalytics) {
    let fx = fixture(vec![ForecastLine::new("706000"), ForecastLine::new("601000")], false);
    let outcome = analytics
        .generate_version_predictions(&fx.module, &fx.forecast_id, &fx.version_id, None)
        .unwrap();
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NothingGenerated));
}

#[rstest]
fn test_copy_actual_to_forecast(analytics: ForecastAnalytics) {
    let mut driven = ForecastLine::new("706000").with_forecast_values(series(&[("2023-06", 1.0)]));
    driven.method = ForecastMethod::DriverBased;
    let lines = vec![driven, ForecastLine::new("601000")];
    let fx = fixture(lines, false);
    let actuals = actual_data(&[("706000", linear_history())]);

    let update = analytics
        .copy_actual_to_forecast(&fx.module, &fx.forecast_id, &fx.version_id, &actuals)
        .unwrap();
    assert_eq!(update.detail, 1);

    let version = update.module.forecasts[0].version(&fx.version_id).unwrap();
    let seeded = &version.lines[0];
    assert_eq!(seeded.forecast_values, linear_history());
    assert_eq!(seeded.actual_values.as_ref(), Some(&linear_history()));
    // Copying values keeps the line's method
    assert_eq!(seeded.method, ForecastMethod::DriverBased);

    let empty = &version.lines[1];
    assert!(empty.forecast_values.is_empty());
    assert_eq!(empty.method, ForecastMethod::Manual);
}

#[rstest]
fn test_reports_are_appended_and_queryable(analytics: ForecastAnalytics) {
    let line = ForecastLine::new("706000").with_forecast_values(series(&[("2025-01", 1000.0)]));
    let fx = fixture(vec![line], false);
    let actuals = actual_data(&[("706000", series(&[("2025-01", 1200.0)]))]);

    let first = analytics
        .create_reconciliation_report(&fx.module, &fx.forecast_id, &fx.version_id, &actuals)
        .unwrap();
    let second = analytics
        .create_reconciliation_report(&first.module, &fx.forecast_id, &fx.version_id, &actuals)
        .unwrap();

    assert_ne!(first.detail.id, second.detail.id);
    assert!(fx.module.reconciliation_reports.is_empty());
    assert_eq!(first.module.reconciliation_reports.len(), 1);
    assert_eq!(second.module.reconciliation_reports.len(), 2);

    let reports = analytics.reconciliation_reports(&second.module, &fx.forecast_id);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, first.detail.id);
    assert_eq!(reports[1].id, second.detail.id);
    assert_eq!(second.module.reports_for(&fx.forecast_id).count(), 2);
    assert!(analytics
        .reconciliation_reports(&second.module, "other")
        .is_empty());
}

#[rstest]
fn test_snapshot_queries(analytics: ForecastAnalytics) {
    let fx = fixture(vec![ForecastLine::new("706000")], true);

    assert!(analytics
        .rolling_snapshots(&fx.module, &fx.forecast_id)
        .is_empty());
    assert!(analytics.rolling_snapshots(&fx.module, "missing").is_empty());

    let update = analytics
        .create_rolling_snapshot(&fx.module, &fx.forecast_id, "2025-02-01")
        .unwrap()
        .applied()
        .unwrap();
    let snapshots = analytics.rolling_snapshots(&update.module, &fx.forecast_id);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0], update.detail);
}

#[rstest]
fn test_configured_helpers(analytics: ForecastAnalytics) {
    let seasonal = seasonal_history().values();
    assert!(analytics.detect_seasonality(&seasonal).has_season);
    assert!(!analytics.detect_seasonality(&seasonal[..20]).has_season);

    let trend = analytics.calculate_trend(&linear_history().values()).unwrap();
    assert_eq!(trend.trend, TrendDirection::Increasing);
    assert!(matches!(
        analytics.calculate_trend(&[]),
        Err(ForecastError::Math(_))
    ));
}
