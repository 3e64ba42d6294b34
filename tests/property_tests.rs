//! Property-based tests for the decision pipeline core.
//!
//! These tests use proptest to verify invariants across a wide range of
//! inputs, helping to catch edge cases that unit tests might miss.

use chrono::{Days, Utc};
use proptest::prelude::*;

use forecast_engine::ml::forecasting::{ForecastResult, Trend};
use forecast_engine::models::SalesDataPoint;
use forecast_engine::services::decision::InventoryDecisionEngine;
use forecast_engine::services::ensemble::EnsembleSelector;
use forecast_engine::services::validation::SeriesValidator;

// Strategies for generating test data
fn quantities_strategy() -> impl Strategy<Value = Vec<u32>> {
    // Daily observations: at least 15 so the span clears the 14-day floor.
    prop::collection::vec(0u32..500, 15..60)
}

fn predictions_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..200.0, 1..30)
}

fn candidate_strategy() -> impl Strategy<Value = ForecastResult> {
    (
        prop::collection::vec(0.0f64..100.0, 7..8),
        0.0f64..1.0,
        any::<bool>(),
    )
        .prop_map(|(predictions, confidence_score, seasonality_detected)| ForecastResult {
            predictions,
            confidence_intervals: None,
            model_name: "candidate".to_string(),
            trend: Trend::Stable,
            seasonality_detected,
            confidence_score,
        })
}

fn daily_history(quantities: &[u32]) -> Vec<SalesDataPoint> {
    let last = Utc::now().date_naive();
    quantities
        .iter()
        .enumerate()
        .map(|(i, &quantity)| {
            let offset = (quantities.len() - 1 - i) as u64;
            let date = last.checked_sub_days(Days::new(offset)).unwrap();
            SalesDataPoint::new(date.format("%Y-%m-%d").to_string(), quantity)
        })
        .collect()
}

// Property: admissible series always get a quality score inside [0, 1]
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn quality_score_is_always_in_unit_interval(quantities in quantities_strategy()) {
        let history = daily_history(&quantities);
        let result = SeriesValidator::default().validate(&history);

        prop_assert!(result.is_valid);
        prop_assert!(
            (0.0..=1.0).contains(&result.data_quality_score),
            "score {} out of range",
            result.data_quality_score
        );
    }
}

// Property: reorder arithmetic never recommends a negative order, and a
// fully covered shelf orders nothing
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn reorder_quantity_is_zero_exactly_when_stock_covers_demand(
        current_stock in 0u32..10_000,
        forecast_demand in 0u32..5_000,
        lead_time_demand in 0u32..5_000,
    ) {
        let engine = InventoryDecisionEngine::default();
        let quantity =
            engine.compute_reorder_quantity(current_stock, forecast_demand, lead_time_demand);

        let safety_stock = (0.2 * f64::from(forecast_demand)).round() as u32;
        let total_demand = forecast_demand + lead_time_demand + safety_stock;
        if current_stock >= total_demand {
            prop_assert_eq!(quantity, 0);
        } else {
            prop_assert!(quantity > 0);
            prop_assert!(quantity >= total_demand - current_stock);
        }
    }

    #[test]
    fn zero_lead_time_never_adds_demand(
        predictions in predictions_strategy(),
        horizon in 1u32..30,
    ) {
        let engine = InventoryDecisionEngine::default();
        prop_assert_eq!(engine.compute_lead_time_demand(&predictions, 0, horizon), 0);
    }

    #[test]
    fn stockout_day_is_consistent_with_days_covered(
        current_stock in 0u32..1_000,
        predictions in predictions_strategy(),
    ) {
        let engine = InventoryDecisionEngine::default();
        let risk = engine.compute_stockout_risk(current_stock, &predictions);

        match risk.stockout_day {
            Some(day) => {
                prop_assert!(risk.at_risk);
                prop_assert!(day >= 1 && day <= predictions.len());
                prop_assert_eq!(risk.days_of_stock_covered, day - 1);
            }
            None => {
                prop_assert!(!risk.at_risk);
                prop_assert_eq!(risk.days_of_stock_covered, predictions.len());
            }
        }
    }
}

// Property: ensemble selection is pure — identical inputs give identical
// outputs, and the result's confidence never leaves [0, 1]
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn selection_is_deterministic_and_bounded(
        a in candidate_strategy(),
        b in candidate_strategy(),
    ) {
        let selector = EnsembleSelector::default();
        let first = selector.select(a.clone(), b.clone());
        let second = selector.select(a, b);

        prop_assert_eq!(&first, &second);
        prop_assert!((0.0..=1.0).contains(&first.confidence_score));
        prop_assert_eq!(first.predictions.len(), 7);
    }
}
