use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::SalesRecord;

/// Overall direction of predicted demand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

/// Output of one model fit. Treated as an opaque value object by the rest of
/// the pipeline; never mutated after construction.
///
/// A `confidence_score` of exactly `0.0` is the model's failure signal: the
/// fit did not converge (or the engine was unavailable) and the predictions
/// carry no information beyond their length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predictions: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_intervals: Option<Vec<(f64, f64)>>,
    pub model_name: String,
    pub trend: Trend,
    pub seasonality_detected: bool,
    pub confidence_score: f64,
}

impl ForecastResult {
    /// Well-formed zero-confidence result for a failed fit. Implementations
    /// of [`Forecaster`] return this instead of propagating their internal
    /// errors, so downstream selection always has a value to inspect.
    pub fn degraded(model_name: impl Into<String>, horizon_days: u32) -> Self {
        Self {
            predictions: vec![0.0; horizon_days as usize],
            confidence_intervals: None,
            model_name: model_name.into(),
            trend: Trend::Stable,
            seasonality_detected: false,
            confidence_score: 0.0,
        }
    }

    /// True when the producing model reported a failed fit.
    pub fn is_degraded(&self) -> bool {
        self.confidence_score == 0.0
    }
}

/// Contract implemented by external model-fitting engines.
///
/// Implementations must never fail: any internal fitting problem degrades to
/// a [`ForecastResult::degraded`] value with a descriptive model name.
/// `predictions.len()` must equal `horizon_days`.
#[async_trait]
pub trait Forecaster: Send + Sync {
    async fn fit_and_forecast(&self, series: &[SalesRecord], horizon_days: u32) -> ForecastResult;
}

/// Trailing-average fallback model.
///
/// Projects the mean of the last seven observations (or of the whole series
/// when shorter) flat across the horizon. This is the degradation tier used
/// when no fitted model is available; its fixed 0.3 confidence keeps it from
/// outranking a converged fit during selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverageForecaster;

impl MovingAverageForecaster {
    pub const MODEL_NAME: &'static str = "Moving-Average-Fallback";
    const WINDOW: usize = 7;
    const CONFIDENCE: f64 = 0.3;

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Forecaster for MovingAverageForecaster {
    async fn fit_and_forecast(&self, series: &[SalesRecord], horizon_days: u32) -> ForecastResult {
        if series.is_empty() {
            return ForecastResult::degraded(Self::MODEL_NAME, horizon_days);
        }

        let window_start = series.len().saturating_sub(Self::WINDOW);
        let window = &series[window_start..];
        let average =
            window.iter().map(|r| f64::from(r.quantity)).sum::<f64>() / window.len() as f64;

        ForecastResult {
            predictions: vec![average.max(0.0); horizon_days as usize],
            confidence_intervals: None,
            model_name: Self::MODEL_NAME.to_string(),
            trend: Trend::Stable,
            seasonality_detected: false,
            confidence_score: Self::CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn daily_series(quantities: &[u32]) -> Vec<SalesRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| SalesRecord {
                date: start + chrono::Days::new(i as u64),
                quantity,
            })
            .collect()
    }

    #[tokio::test]
    async fn moving_average_uses_trailing_window() {
        let series = daily_series(&[100, 100, 100, 7, 7, 7, 7, 7, 7, 7]);
        let result = MovingAverageForecaster::new()
            .fit_and_forecast(&series, 5)
            .await;

        assert_eq!(result.predictions.len(), 5);
        for value in &result.predictions {
            assert!((value - 7.0).abs() < 1e-9);
        }
        assert_eq!(result.model_name, MovingAverageForecaster::MODEL_NAME);
        assert_eq!(result.trend, Trend::Stable);
        assert!(!result.is_degraded());
    }

    #[tokio::test]
    async fn moving_average_handles_short_series() {
        let series = daily_series(&[4, 8]);
        let result = MovingAverageForecaster::new()
            .fit_and_forecast(&series, 3)
            .await;
        for value in &result.predictions {
            assert!((value - 6.0).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn empty_series_degrades() {
        let result = MovingAverageForecaster::new().fit_and_forecast(&[], 7).await;
        assert!(result.is_degraded());
        assert_eq!(result.predictions, vec![0.0; 7]);
    }

    #[test]
    fn degraded_result_matches_horizon() {
        let result = ForecastResult::degraded("ARIMA-unavailable", 14);
        assert_eq!(result.predictions.len(), 14);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.is_degraded());
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Trend::Increasing).unwrap(),
            "\"increasing\""
        );
        assert_eq!(Trend::Decreasing.to_string(), "decreasing");
    }
}
