mod common;

use assert_approx_eq::assert_approx_eq;
use chrono::Utc;
use common::{linear_history, period, seasonal_history, series};
use forecast_engine::model::{ForecastLine, ForecastMethod};
use forecast_engine::outcome::{Outcome, SkipReason};
use forecast_engine::prediction::PredictionGenerator;
use forecast_engine::AnalyticsConfig;
use forecast_math::{stats, PeriodSeries, TrendDirection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rstest::rstest;

fn generator() -> PredictionGenerator {
    PredictionGenerator::new(&AnalyticsConfig::default()).unwrap()
}

#[test]
fn test_linear_history_continues_trend() {
    let prediction = generator()
        .predict(&linear_history(), 24)
        .unwrap()
        .applied()
        .expect("24 points are enough history");

    assert_eq!(prediction.window_len, 24);
    assert_eq!(prediction.window_end, period("2024-12"));
    assert_approx_eq!(prediction.trend.slope, 60.0, 1e-9);
    assert_approx_eq!(prediction.trend.intercept, 1000.0, 1e-9);
    assert_eq!(prediction.trend.trend, TrendDirection::Increasing);
    assert!(!prediction.seasonality.has_season);

    let ml = &prediction.ml_prediction;
    assert_eq!(ml.confidence, 60);
    assert!(!ml.seasonality_detected);
    assert_eq!(ml.trend, TrendDirection::Increasing);

    // Twelve periods right after the window
    let keys: Vec<String> = prediction.forecast_values.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys.len(), 12);
    assert_eq!(keys.first().unwrap(), "2025-01");
    assert_eq!(keys.last().unwrap(), "2025-12");

    // The regression line is evaluated at index n + i
    assert_approx_eq!(prediction.forecast_values.get(&period("2025-01")).unwrap(), 2500.0, 1e-6);
    assert_approx_eq!(prediction.forecast_values.get(&period("2025-12")).unwrap(), 3160.0, 1e-6);

    let values = prediction.forecast_values.values();
    assert!(values.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_confidence_band_has_fixed_width() {
    let history = linear_history();
    let prediction = generator().predict(&history, 24).unwrap().applied().unwrap();
    let std_dev = stats::population_std_dev(&history.values());
    assert_approx_eq!(prediction.std_dev, std_dev, 1e-9);

    let ml = &prediction.ml_prediction;
    for (period, value) in &prediction.forecast_values {
        let lower = ml.lower_bound.get(period).unwrap();
        let upper = ml.upper_bound.get(period).unwrap();
        assert_approx_eq!(value - lower, 1.96 * std_dev, 1e-6);
        assert_approx_eq!(upper - value, 1.96 * std_dev, 1e-6);
    }
}

#[test]
fn test_seasonal_history_applies_seasonal_factor() {
    let history = seasonal_history();
    let values = history.values();
    let prediction = generator().predict(&history, 36).unwrap().applied().unwrap();

    assert!(prediction.seasonality.has_season);
    assert_eq!(prediction.seasonality.period, Some(12));
    assert_eq!(prediction.ml_prediction.confidence, 75);
    assert!(prediction.ml_prediction.seasonality_detected);

    let n = values.len();
    for (step, (_, &point)) in prediction.forecast_values.iter().enumerate() {
        let i = step + 1;
        let factor = values[(n + i - 1) % 12] / prediction.mean;
        let expected = prediction.trend.value_at((n + i) as f64) * factor;
        assert_approx_eq!(point, expected, 1e-9);
    }
}

#[test]
fn test_zero_month_uses_neutral_seasonal_factor() {
    let mut history = seasonal_history();
    for january in ["2022-01", "2023-01", "2024-01"] {
        history.insert(period(january), 0.0);
    }
    let values = history.values();
    let prediction = generator().predict(&history, 36).unwrap().applied().unwrap();
    assert!(prediction.seasonality.has_season);

    // January falls back to the window mean, so the trend value is kept
    let january = prediction.forecast_values.get(&period("2025-01")).unwrap();
    assert_approx_eq!(january, prediction.trend.value_at(37.0), 1e-9);
    assert!(january > 0.0);

    let february = prediction.forecast_values.get(&period("2025-02")).unwrap();
    let factor = values[1] / prediction.mean;
    assert_approx_eq!(february, prediction.trend.value_at(38.0) * factor, 1e-9);
}

#[test]
fn test_lookback_limits_window() {
    let mut history = PeriodSeries::consecutive(period("2022-01"), &[5000.0; 12]);
    history.merge(&linear_history());

    let prediction = generator().predict(&history, 12).unwrap().applied().unwrap();
    assert_eq!(prediction.window_len, 12);
    assert_eq!(prediction.window_end, period("2024-12"));
    assert_approx_eq!(prediction.trend.slope, 60.0, 1e-9);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
fn test_insufficient_history_is_skipped(#[case] points: usize) {
    let values: Vec<f64> = (0..points).map(|i| 100.0 + i as f64).collect();
    let history = PeriodSeries::consecutive(period("2024-01"), &values);

    let outcome = generator().predict(&history, 24).unwrap();
    assert_eq!(
        outcome.skip_reason(),
        Some(SkipReason::InsufficientHistory {
            available: points,
            required: 3
        })
    );
}

#[test]
fn test_short_lookback_is_skipped_even_with_long_history() {
    let outcome = generator().predict(&linear_history(), 2).unwrap();
    assert!(outcome.is_skipped());
}

#[test]
fn test_line_without_actuals_is_skipped() {
    let line = ForecastLine::new("601000");
    let outcome = generator().apply(&line, 24, Utc::now()).unwrap();
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoActuals));
}

#[test]
fn test_apply_merges_into_existing_forecast_values() {
    let existing = series(&[("2022-06", 42.0), ("2025-01", 1.0)]);
    let line = ForecastLine::new("706000")
        .with_forecast_values(existing)
        .with_actual_values(linear_history());

    let generated = match generator().apply(&line, 24, Utc::now()).unwrap() {
        Outcome::Applied(generated) => generated,
        Outcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };
    let updated = generated.line;

    assert_eq!(updated.method, ForecastMethod::MlPrediction);
    assert_eq!(updated.forecast_values.get(&period("2022-06")), Some(42.0));
    assert_approx_eq!(updated.forecast_values.get(&period("2025-01")).unwrap(), 2500.0, 1e-6);
    assert_eq!(updated.forecast_values.len(), 13);
    assert!(updated.ml_prediction.is_some());

    // The source line is left as it was
    assert_eq!(line.method, ForecastMethod::Manual);
    assert_eq!(line.forecast_values.get(&period("2025-01")), Some(1.0));
    assert!(line.ml_prediction.is_none());
}

#[test]
fn test_regeneration_replaces_prediction_block() {
    let predictor = generator();
    let line = ForecastLine::new("706000").with_actual_values(seasonal_history());
    let first = predictor.apply(&line, 36, Utc::now()).unwrap().applied().unwrap().line;
    assert_eq!(first.ml_prediction.as_ref().unwrap().confidence, 75);

    // A shorter lookback drops below the seasonality floor
    let second = predictor.apply(&first, 12, Utc::now()).unwrap().applied().unwrap().line;
    let ml = second.ml_prediction.unwrap();
    assert_eq!(ml.confidence, 60);
    assert!(!ml.seasonality_detected);
}

#[test]
fn test_custom_horizon_and_confidence() {
    let mut config = AnalyticsConfig::default();
    config.prediction.horizon_periods = 6;
    config.prediction.base_confidence = 50;
    let predictor = PredictionGenerator::new(&config).unwrap();

    let prediction = predictor.predict(&linear_history(), 24).unwrap().applied().unwrap();
    assert_eq!(prediction.forecast_values.len(), 6);
    assert_eq!(prediction.forecast_values.last_period(), Some(period("2025-06")));
    assert_eq!(prediction.ml_prediction.confidence, 50);
}

#[test]
fn test_noisy_histories_produce_finite_output() {
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 150.0).unwrap();
    let predictor = generator();

    for _ in 0..50 {
        let len = rng.gen_range(3..48);
        let base = rng.gen_range(-500.0..5000.0);
        let values: Vec<f64> = (0..len)
            .map(|i| base + 25.0 * i as f64 + noise.sample(&mut rng))
            .collect();
        let history = PeriodSeries::consecutive(period("2020-01"), &values);

        let prediction = predictor.predict(&history, 24).unwrap().applied().unwrap();
        let ml = &prediction.ml_prediction;
        for (period, value) in &prediction.forecast_values {
            assert!(value.is_finite());
            assert!(ml.lower_bound.get(period).unwrap().is_finite());
            assert!(ml.upper_bound.get(period).unwrap().is_finite());
        }
    }
}
