use crate::config::EnsembleConfig;
use crate::ml::forecasting::ForecastResult;

/// Combines two independently fitted forecasts into the one the decision
/// engine consumes.
///
/// Selection is pure and deterministic: identical candidates always produce
/// an identical result. The rule is asymmetric by design — candidate B is
/// the seasonality-aware fit and wins ties.
#[derive(Debug, Clone)]
pub struct EnsembleSelector {
    confidence_margin: f64,
}

impl Default for EnsembleSelector {
    fn default() -> Self {
        Self::new(&EnsembleConfig::default())
    }
}

impl EnsembleSelector {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            confidence_margin: config.confidence_margin,
        }
    }

    /// Pick one of the candidates or blend them.
    ///
    /// A confidence of exactly zero is the model's failure signal; the
    /// surviving candidate is returned unchanged. Otherwise a candidate
    /// whose confidence clears the other's by the configured margin wins
    /// outright (B additionally needs a seasonality signal), and comparable
    /// candidates are averaged elementwise.
    ///
    /// Both candidates must have been fitted for the same horizon; a length
    /// mismatch is an upstream wiring defect, not a runtime condition.
    pub fn select(&self, candidate_a: ForecastResult, candidate_b: ForecastResult) -> ForecastResult {
        if candidate_a.confidence_score == 0.0 {
            return candidate_b;
        }
        if candidate_b.confidence_score == 0.0 {
            return candidate_a;
        }

        if candidate_b.confidence_score > candidate_a.confidence_score * self.confidence_margin
            && candidate_b.seasonality_detected
        {
            return candidate_b;
        }

        if candidate_a.confidence_score > candidate_b.confidence_score * self.confidence_margin {
            return candidate_a;
        }

        assert_eq!(
            candidate_a.predictions.len(),
            candidate_b.predictions.len(),
            "ensemble candidates were fitted for different horizons"
        );

        let predictions: Vec<f64> = candidate_a
            .predictions
            .iter()
            .zip(&candidate_b.predictions)
            .map(|(&a, &b)| (a + b) / 2.0)
            .collect();
        let confidence_score =
            (candidate_a.confidence_score + candidate_b.confidence_score) / 2.0;

        let (trend, seasonality_detected) =
            if candidate_b.confidence_score >= candidate_a.confidence_score {
                (candidate_b.trend, candidate_b.seasonality_detected)
            } else {
                (candidate_a.trend, candidate_a.seasonality_detected)
            };

        ForecastResult {
            predictions,
            confidence_intervals: None,
            model_name: format!(
                "Ensemble-{}-{}",
                candidate_a.model_name, candidate_b.model_name
            ),
            trend,
            seasonality_detected,
            confidence_score,
        }
    }
}
