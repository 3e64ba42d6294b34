use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::errors::ServiceError;
use crate::models::{SalesDataPoint, SalesRecord};

/// Minimum number of observations required before a series is admissible.
pub const MIN_DATA_POINTS: usize = 14;
/// Minimum span in days between the first and last observation.
pub const MIN_DAYS_SPAN: i64 = 14;

const STALE_DATA_DAYS: i64 = 30;
const RECENT_DATA_DAYS: i64 = 7;
const MISSING_PERIOD_GAP_DAYS: i64 = 3;
const WEEKLY_LAG: usize = 7;
const SIGNIFICANT_OUTLIER_RATIO: f64 = 0.1;
const DENSITY_EPS: f64 = 0.5;
const DENSITY_MIN_SAMPLES: usize = 3;
const DENSITY_MIN_POINTS: usize = 10;

/// Outcome of an admissibility check. Produced once per validation call and
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub insufficient_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
    pub data_quality_score: f64,
}

impl ValidationResult {
    fn rejected(insufficient_data: bool, message: String) -> Self {
        Self {
            is_valid: false,
            insufficient_data,
            error_message: Some(message),
            warnings: Vec::new(),
            data_quality_score: 0.0,
        }
    }
}

/// A single observation flagged as a spike or drop, with the range the
/// trailing window considered normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub date: NaiveDate,
    pub quantity: u32,
    pub expected_range: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gap_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub sudden_spikes: Vec<AnomalyPoint>,
    pub sudden_drops: Vec<AnomalyPoint>,
    pub missing_periods: Vec<MissingPeriod>,
    pub weak_weekly_pattern: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lag7_autocorrelation: Option<f64>,
}

/// Parse raw sale dates and return the observations sorted by date.
pub fn parse_series(history: &[SalesDataPoint]) -> Result<Vec<SalesRecord>, ServiceError> {
    let mut series = Vec::with_capacity(history.len());
    for point in history {
        let date = NaiveDate::parse_from_str(&point.date, "%Y-%m-%d").map_err(|err| {
            ServiceError::MalformedInput(format!("invalid sale date '{}': {}", point.date, err))
        })?;
        series.push(SalesRecord {
            date,
            quantity: point.quantity_sold,
        });
    }
    series.sort_by_key(|record| record.date);
    Ok(series)
}

/// Validates sales history against the minimum-data requirements and scores
/// how trustworthy the series is for forecasting.
#[derive(Debug, Clone)]
pub struct SeriesValidator {
    min_data_points: usize,
    min_days_span: i64,
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self {
            min_data_points: MIN_DATA_POINTS,
            min_days_span: MIN_DAYS_SPAN,
        }
    }
}

impl SeriesValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            min_data_points: config.min_data_points,
            min_days_span: config.min_days_span,
        }
    }

    /// Check that the history meets the minimum requirements for
    /// forecasting. Expected shortfalls (too few points, short span) are
    /// signaled through the result, never as an error.
    pub fn validate(&self, history: &[SalesDataPoint]) -> ValidationResult {
        self.validate_at(history, Utc::now())
    }

    /// Clock-explicit variant of [`validate`](Self::validate); recency
    /// checks are relative to `now`.
    pub fn validate_at(&self, history: &[SalesDataPoint], now: DateTime<Utc>) -> ValidationResult {
        if history.is_empty() {
            return ValidationResult::rejected(true, "No sales data provided".to_string());
        }

        if history.len() < self.min_data_points {
            return ValidationResult::rejected(
                true,
                format!(
                    "Insufficient data points. Need at least {} data points, got {}",
                    self.min_data_points,
                    history.len()
                ),
            );
        }

        let series = match parse_series(history) {
            Ok(series) => series,
            Err(err) => return ValidationResult::rejected(false, err.to_string()),
        };

        let first = series.first().expect("series is non-empty");
        let last = series.last().expect("series is non-empty");
        let date_span = (last.date - first.date).num_days();
        if date_span < self.min_days_span {
            return ValidationResult::rejected(
                true,
                format!(
                    "Data span too short. Need at least {} days of data, got {} days",
                    self.min_days_span, date_span
                ),
            );
        }

        let mut warnings = Vec::new();
        let data_quality_score = self.quality_score(&series, now, &mut warnings);

        let days_since_last = (now.date_naive() - last.date).num_days();
        if days_since_last > STALE_DATA_DAYS {
            warnings.push(format!(
                "Last sale was {} days ago. Forecast may be less accurate.",
                days_since_last
            ));
        }

        let zero_count = series.iter().filter(|r| r.quantity == 0).count();
        if zero_count as f64 > series.len() as f64 * 0.5 {
            warnings.push(
                "More than 50% of data points have zero sales. This may affect forecast accuracy."
                    .to_string(),
            );
        }

        let quantities: Vec<f64> = series.iter().map(|r| f64::from(r.quantity)).collect();
        if self.has_significant_outliers(&quantities) {
            warnings.push(
                "Significant outliers detected in sales data. Consider reviewing for data entry errors."
                    .to_string(),
            );
        }

        ValidationResult {
            is_valid: true,
            insufficient_data: false,
            error_message: None,
            warnings,
            data_quality_score,
        }
    }

    /// Scan a parsed, date-sorted series for spikes, drops, coverage gaps
    /// and a missing weekly rhythm.
    pub fn detect_anomalies(&self, series: &[SalesRecord]) -> AnomalyReport {
        let quantities: Vec<f64> = series.iter().map(|r| f64::from(r.quantity)).collect();
        let mut report = AnomalyReport::default();

        // Spikes and drops against a trailing window of up to seven prior
        // observations; at least three samples before a verdict is emitted.
        for (i, record) in series.iter().enumerate() {
            let window = &quantities[i.saturating_sub(WEEKLY_LAG)..i];
            if window.len() < 3 {
                continue;
            }
            let window_mean = mean(window);
            let window_std = sample_std(window);
            if window_std <= 0.0 {
                continue;
            }

            let value = quantities[i];
            let expected_range = format!(
                "{:.1} - {:.1}",
                window_mean - window_std,
                window_mean + window_std
            );
            if value > window_mean + 3.0 * window_std {
                report.sudden_spikes.push(AnomalyPoint {
                    date: record.date,
                    quantity: record.quantity,
                    expected_range,
                });
            } else if value < (window_mean - 3.0 * window_std).max(0.0) && window_mean > window_std
            {
                report.sudden_drops.push(AnomalyPoint {
                    date: record.date,
                    quantity: record.quantity,
                    expected_range,
                });
            }
        }

        for pair in series.windows(2) {
            let gap_days = (pair[1].date - pair[0].date).num_days();
            if gap_days > MISSING_PERIOD_GAP_DAYS {
                report.missing_periods.push(MissingPeriod {
                    start_date: pair[0].date,
                    end_date: pair[1].date,
                    gap_days,
                });
            }
        }

        if quantities.len() >= MIN_DATA_POINTS {
            if let Some(autocorr) = lag_autocorrelation(&quantities, WEEKLY_LAG) {
                report.lag7_autocorrelation = Some(autocorr);
                report.weak_weekly_pattern = autocorr.abs() < 0.1;
            }
        }

        report
    }

    fn quality_score(
        &self,
        series: &[SalesRecord],
        now: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> f64 {
        let mut score = 1.0;
        let quantities: Vec<f64> = series.iter().map(|r| f64::from(r.quantity)).collect();

        // Collection frequency.
        let gaps: Vec<f64> = series
            .windows(2)
            .map(|pair| (pair[1].date - pair[0].date).num_days() as f64)
            .collect();
        if mean(&gaps) > 2.0 {
            score -= 0.15;
            warnings.push(
                "Irregular data frequency detected. Daily data recommended for best accuracy."
                    .to_string(),
            );
        }
        if sample_std(&gaps) > 3.0 {
            score -= 0.1;
            warnings.push("Inconsistent data collection intervals detected.".to_string());
        }

        // Dispersion.
        let quantity_mean = mean(&quantities);
        let cv = if quantity_mean > 0.0 {
            population_std(&quantities) / quantity_mean
        } else {
            0.0
        };
        if cv > 2.0 {
            score -= 0.15;
            warnings.push(
                "High sales variability detected. Forecast confidence may be lower.".to_string(),
            );
        } else if cv > 1.0 {
            score -= 0.05;
        }

        // Zero inflation.
        let zero_ratio = quantities.iter().filter(|&&q| q == 0.0).count() as f64
            / quantities.len() as f64;
        if zero_ratio > 0.5 {
            score -= 0.25;
            warnings
                .push("More than 50% zero sales days. Consider product lifecycle stage.".to_string());
        } else if zero_ratio > 0.3 {
            score -= 0.15;
        }

        score += 0.1 * trend_consistency(&quantities);

        if quantities.len() >= MIN_DATA_POINTS {
            if let Some(autocorr) = lag_autocorrelation(&quantities, WEEKLY_LAG) {
                score += 0.1 * autocorr.abs();
            }
        }

        score -= 0.2 * outlier_impact(&quantities);

        // Recency.
        let days_since_last = (now.date_naive()
            - series.last().expect("series is non-empty").date)
            .num_days();
        if days_since_last <= RECENT_DATA_DAYS {
            score += 0.05;
        } else if days_since_last > STALE_DATA_DAYS {
            score -= 0.1;
            warnings.push(format!(
                "Data is {} days old. Recent data improves accuracy.",
                days_since_last
            ));
        }

        score.clamp(0.0, 1.0)
    }

    fn has_significant_outliers(&self, quantities: &[f64]) -> bool {
        if quantities.len() < 4 {
            return false;
        }
        iqr_outlier_ratio(quantities) > SIGNIFICANT_OUTLIER_RATIO
            || zscore_outlier_ratio(quantities) > SIGNIFICANT_OUTLIER_RATIO
            || density_outlier_ratio(quantities) > SIGNIFICANT_OUTLIER_RATIO
    }
}

/// Consistency of the smoothed trend: 1.0 when the 3-point moving average
/// never changes direction, 0.0 when it flips at every step.
fn trend_consistency(quantities: &[f64]) -> f64 {
    if quantities.len() < 7 {
        return 0.0;
    }
    let ma3 = moving_average(quantities, 3);
    let deltas: Vec<f64> = ma3.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let signs: Vec<f64> = deltas.iter().map(|&d| sign(d)).collect();
    let sign_changes: Vec<f64> = signs.windows(2).map(|pair| pair[1] - pair[0]).collect();
    if sign_changes.is_empty() {
        return 0.0;
    }
    let changed = sign_changes.iter().filter(|&&c| c != 0.0).count();
    1.0 - changed as f64 / sign_changes.len() as f64
}

/// Average fraction of points the three estimators flag, scaled to a [0,1]
/// impact value.
fn outlier_impact(quantities: &[f64]) -> f64 {
    if quantities.len() < 4 {
        return 0.0;
    }
    let combined = (iqr_outlier_ratio(quantities)
        + zscore_outlier_ratio(quantities)
        + density_outlier_ratio(quantities))
        / 3.0;
    (combined * 2.0).min(1.0)
}

/// Tukey fences: fraction of points outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
fn iqr_outlier_ratio(quantities: &[f64]) -> f64 {
    let mut sorted = quantities.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("quantities are finite"));
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    let outliers = quantities.iter().filter(|&&q| q < lower || q > upper).count();
    outliers as f64 / quantities.len() as f64
}

/// Fraction of points more than three standard deviations from the mean.
/// A zero-variance series has no z-outliers by definition.
fn zscore_outlier_ratio(quantities: &[f64]) -> f64 {
    let std = population_std(quantities);
    if std == 0.0 {
        return 0.0;
    }
    let mean = mean(quantities);
    let outliers = quantities
        .iter()
        .filter(|&&q| ((q - mean) / std).abs() > 3.0)
        .count();
    outliers as f64 / quantities.len() as f64
}

/// Density-based noise labeling over standardized quantities: a point is
/// noise when it is neither a core point (at least `DENSITY_MIN_SAMPLES`
/// neighbours within `DENSITY_EPS`, itself included) nor within reach of
/// one. Contributes nothing below `DENSITY_MIN_POINTS` observations.
fn density_outlier_ratio(quantities: &[f64]) -> f64 {
    if quantities.len() < DENSITY_MIN_POINTS {
        return 0.0;
    }
    let std = population_std(quantities);
    if std == 0.0 {
        return 0.0;
    }
    let mean = mean(quantities);
    let scaled: Vec<f64> = quantities.iter().map(|&q| (q - mean) / std).collect();

    let neighbour_counts: Vec<usize> = scaled
        .iter()
        .map(|&a| scaled.iter().filter(|&&b| (a - b).abs() <= DENSITY_EPS).count())
        .collect();
    let core: Vec<bool> = neighbour_counts
        .iter()
        .map(|&count| count >= DENSITY_MIN_SAMPLES)
        .collect();

    let noise = scaled
        .iter()
        .enumerate()
        .filter(|&(i, &a)| {
            !core[i]
                && !scaled
                    .iter()
                    .enumerate()
                    .any(|(j, &b)| core[j] && (a - b).abs() <= DENSITY_EPS)
        })
        .count();
    noise as f64 / quantities.len() as f64
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Linear-interpolation percentile over pre-sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    values.windows(window).map(mean).collect()
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Pearson correlation between the series and itself shifted by `lag`.
/// `None` when there are too few points or either slice has no variance.
pub(crate) fn lag_autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if values.len() <= lag + 1 {
        return None;
    }
    let head = &values[..values.len() - lag];
    let tail = &values[lag..];
    let head_mean = mean(head);
    let tail_mean = mean(tail);

    let covariance: f64 = head
        .iter()
        .zip(tail)
        .map(|(&a, &b)| (a - head_mean) * (b - tail_mean))
        .sum();
    let head_var: f64 = head.iter().map(|&a| (a - head_mean).powi(2)).sum();
    let tail_var: f64 = tail.iter().map(|&b| (b - tail_mean).powi(2)).sum();

    let denominator = (head_var * tail_var).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, Utc};

    fn daily_history(quantities: &[u32]) -> (Vec<SalesDataPoint>, DateTime<Utc>) {
        let now = Utc::now();
        let last = now.date_naive();
        let history = quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| {
                let offset = (quantities.len() - 1 - i) as u64;
                let date = last.checked_sub_days(Days::new(offset)).unwrap();
                SalesDataPoint::new(date.format("%Y-%m-%d").to_string(), quantity)
            })
            .collect();
        (history, now)
    }

    fn records(quantities: &[u32]) -> Vec<SalesRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| SalesRecord {
                date: start + Days::new(i as u64),
                quantity,
            })
            .collect()
    }

    #[test]
    fn regular_low_dispersion_series_scores_high() {
        let (history, now) = daily_history(&[5, 6, 7, 5, 6, 7, 5, 6, 7, 5, 6, 7, 5, 6, 7]);
        let result = SeriesValidator::default().validate_at(&history, now);

        assert!(result.is_valid);
        assert!(!result.insufficient_data);
        assert!(
            result.data_quality_score > 0.7,
            "expected > 0.7, got {}",
            result.data_quality_score
        );
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let (history, now) = daily_history(&[3, 4, 5, 4, 3]);
        let result = SeriesValidator::default().validate_at(&history, now);

        assert!(!result.is_valid);
        assert!(result.insufficient_data);
        let message = result.error_message.unwrap();
        assert!(message.contains("at least 14 data points"), "{}", message);
    }

    #[test]
    fn empty_series_is_rejected() {
        let result = SeriesValidator::default().validate(&[]);
        assert!(!result.is_valid);
        assert!(result.insufficient_data);
        assert_eq!(result.error_message.as_deref(), Some("No sales data provided"));
    }

    #[test]
    fn unparseable_date_is_a_structural_failure() {
        let (mut history, now) = daily_history(&[5; 15]);
        history[3].date = "03/15/2025".to_string();
        let result = SeriesValidator::default().validate_at(&history, now);

        assert!(!result.is_valid);
        assert!(!result.insufficient_data);
        assert!(result.error_message.unwrap().contains("03/15/2025"));
    }

    #[test]
    fn short_span_is_insufficient_data() {
        // 14 observations packed into a week.
        let now = Utc::now();
        let last = now.date_naive();
        let history: Vec<SalesDataPoint> = (0..14)
            .map(|i| {
                let date = last.checked_sub_days(Days::new((i / 2) as u64)).unwrap();
                SalesDataPoint::new(date.format("%Y-%m-%d").to_string(), 5)
            })
            .collect();

        let result = SeriesValidator::default().validate_at(&history, now);
        assert!(!result.is_valid);
        assert!(result.insufficient_data);
        assert!(result.error_message.unwrap().contains("span too short"));
    }

    #[test]
    fn zero_inflation_penalty_steps_down() {
        let steady = vec![4u32; 20];
        let mut third_zeros = vec![4u32; 20];
        for q in third_zeros.iter_mut().skip(13) {
            *q = 0;
        }
        let mut mostly_zeros = vec![4u32; 20];
        for q in mostly_zeros.iter_mut().skip(8) {
            *q = 0;
        }

        let validator = SeriesValidator::default();
        let (history, now) = daily_history(&steady);
        let base = validator.validate_at(&history, now).data_quality_score;
        let (history, now) = daily_history(&third_zeros);
        let mid = validator.validate_at(&history, now).data_quality_score;
        let (history, now) = daily_history(&mostly_zeros);
        let heavy = validator.validate_at(&history, now).data_quality_score;

        assert!(base > mid, "base {} should exceed mid {}", base, mid);
        assert!(mid > heavy, "mid {} should exceed heavy {}", mid, heavy);
    }

    #[test]
    fn heavy_zero_inflation_warns_twice() {
        let mut quantities = vec![6u32; 20];
        for q in quantities.iter_mut().skip(8) {
            *q = 0;
        }
        let (history, now) = daily_history(&quantities);
        let result = SeriesValidator::default().validate_at(&history, now);

        assert!(result.is_valid);
        let zero_warnings = result
            .warnings
            .iter()
            .filter(|w| w.contains("zero sales"))
            .count();
        assert_eq!(zero_warnings, 2, "warnings: {:?}", result.warnings);
    }

    #[test]
    fn stale_series_warns_and_loses_score() {
        // Enough zero-inflation to keep the fresh score clear of the upper
        // clamp, so the recency swing is observable.
        let mut quantities = vec![4u32; 20];
        for q in quantities.iter_mut().skip(8) {
            *q = 0;
        }
        let (history, now) = daily_history(&quantities);
        let validator = SeriesValidator::default();
        let fresh = validator.validate_at(&history, now);
        let stale = validator.validate_at(&history, now + chrono::Duration::days(45));

        assert!(stale.is_valid, "staleness is advisory, not fatal");
        assert!(stale
            .warnings
            .iter()
            .any(|w| w.contains("Recent data improves accuracy")));
        assert!(stale.warnings.iter().any(|w| w.contains("days ago")));
        assert!(stale.data_quality_score < fresh.data_quality_score);
    }

    #[test]
    fn spiky_series_warns_about_outliers() {
        // Two far-out points in fifteen put the Tukey-fence ratio past 10%.
        let (history, now) = daily_history(&[5, 6, 5, 4, 6, 5, 40, 5, 6, 4, 5, 45, 5, 6, 5]);
        let result = SeriesValidator::default().validate_at(&history, now);

        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Significant outliers")));
    }

    #[test]
    fn quality_score_stays_in_unit_interval() {
        let (history, now) =
            daily_history(&[0, 0, 0, 900, 0, 0, 0, 1, 0, 0, 800, 0, 0, 0, 0, 2, 0, 0]);
        let result = SeriesValidator::default().validate_at(&history, now);
        assert!(result.is_valid);
        assert!((0.0..=1.0).contains(&result.data_quality_score));
    }

    #[test]
    fn detects_sudden_spikes() {
        let series = records(&[5, 6, 4, 5, 7, 25, 6, 5, 4, 0, 0, 0, 6, 5, 4, 30, 5, 6, 4, 5]);
        let report = SeriesValidator::default().detect_anomalies(&series);

        assert!(
            report.sudden_spikes.len() >= 2,
            "expected at least two spikes, got {:?}",
            report.sudden_spikes
        );
        let spiked: Vec<u32> = report.sudden_spikes.iter().map(|p| p.quantity).collect();
        assert!(spiked.contains(&25));
        assert!(spiked.contains(&30));
    }

    #[test]
    fn detects_sudden_drops() {
        let series = records(&[50, 52, 48, 51, 49, 50, 52, 2, 50, 51, 49, 50, 48, 52]);
        let report = SeriesValidator::default().detect_anomalies(&series);
        assert_eq!(report.sudden_drops.len(), 1, "{:?}", report.sudden_drops);
        assert_eq!(report.sudden_drops[0].quantity, 2);
    }

    #[test]
    fn reports_missing_periods() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let mut series = records(&[5, 6, 7, 5, 6]);
        series.push(SalesRecord {
            date: start + Days::new(14),
            quantity: 6,
        });
        let report = SeriesValidator::default().detect_anomalies(&series);

        assert_eq!(report.missing_periods.len(), 1);
        assert_eq!(report.missing_periods[0].gap_days, 10);
        assert_eq!(report.missing_periods[0].start_date, start + Days::new(4));
    }

    #[test]
    fn flags_weak_weekly_pattern() {
        // Period-four cycle: the lag-7 autocorrelation is exactly zero.
        let series = records(&[5, 8, 5, 2, 5, 8, 5, 2, 5, 8, 5, 2, 5, 8, 5, 2]);
        let report = SeriesValidator::default().detect_anomalies(&series);

        assert!(report.weak_weekly_pattern);
        assert!(report.lag7_autocorrelation.unwrap().abs() < 0.1);
    }

    #[test]
    fn strong_weekly_pattern_is_not_flagged() {
        let week = [20u32, 3, 3, 3, 3, 3, 3];
        let quantities: Vec<u32> = week.iter().copied().cycle().take(21).collect();
        let report = SeriesValidator::default().detect_anomalies(&records(&quantities));

        assert!(!report.weak_weekly_pattern);
        assert!(report.lag7_autocorrelation.unwrap() > 0.9);
    }

    #[test]
    fn autocorrelation_needs_variance() {
        assert_eq!(lag_autocorrelation(&[4.0; 20], 7), None);
        assert_eq!(lag_autocorrelation(&[1.0, 2.0], 7), None);
    }

    #[test]
    fn parse_series_sorts_by_date() {
        let history = vec![
            SalesDataPoint::new("2025-02-03", 3),
            SalesDataPoint::new("2025-02-01", 1),
            SalesDataPoint::new("2025-02-02", 2),
        ];
        let series = parse_series(&history).unwrap();
        let quantities: Vec<u32> = series.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![1, 2, 3]);
    }
}
