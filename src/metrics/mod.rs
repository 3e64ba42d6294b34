/*!
 * # Metrics Module
 *
 * Process-wide ledger of per-request forecast outcomes. One
 * [`PerformanceMonitor`] is constructed at startup and handed to every
 * request path as an `Arc`; it is the only shared mutable state in the
 * crate, and a single mutex serializes every read-modify-write so
 * concurrent requests never observe a torn aggregate.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MonitorConfig;

/// Outcome of a single forecast request. Immutable after creation; owned by
/// the monitor for the lifetime of its rolling history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub timestamp: DateTime<Utc>,
    pub sku: String,
    pub user_id: String,
    pub model_used: String,
    pub processing_time_ms: f64,
    pub data_points: usize,
    pub forecast_days: u32,
    pub confidence_score: f64,
    pub data_quality_score: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct ModelSample {
    confidence: f64,
    quality: f64,
    processing_time_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct MonitorState {
    history: VecDeque<ForecastMetrics>,
    model_performance: HashMap<String, Vec<ModelSample>>,
    error_counts: HashMap<String, u64>,
    processing_times: VecDeque<f64>,
}

/// Processing-time aggregate over a summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTimeStats {
    pub avg_processing_time_ms: f64,
    pub max_processing_time_ms: f64,
    pub min_processing_time_ms: f64,
    pub slow_requests: usize,
}

/// Confidence/quality aggregate over the successful requests of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQualityStats {
    pub avg_confidence_score: f64,
    pub avg_data_quality_score: f64,
    pub low_confidence_forecasts: usize,
    pub low_quality_data: usize,
}

/// Windowed summary of recent request outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub time_period_hours: i64,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub success_rate: f64,
    pub performance: ProcessingTimeStats,
    pub forecast_quality: ForecastQualityStats,
    pub model_usage: HashMap<String, u64>,
    pub recent_errors: HashMap<String, u64>,
}

/// Per-model aggregate across every recorded run of that model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub success_rate: f64,
    pub avg_confidence: f64,
    pub avg_quality: f64,
    pub avg_processing_time_ms: f64,
    pub confidence_std: f64,
    pub quality_std: f64,
}

/// Thread-safe ledger of forecast request outcomes with a bounded rolling
/// history (oldest evicted first past capacity).
#[derive(Debug)]
pub struct PerformanceMonitor {
    config: MonitorConfig,
    state: Mutex<MonitorState>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MonitorState::default()),
        }
    }

    /// Append one request outcome and update the per-model ledgers. Slow,
    /// low-confidence and low-quality outcomes emit advisory log events,
    /// never errors.
    pub fn record(&self, metrics: ForecastMetrics) {
        let mut state = self.state.lock().expect("metrics mutex poisoned");

        if state.history.len() >= self.config.max_history_size {
            state.history.pop_front();
        }

        state
            .model_performance
            .entry(metrics.model_used.clone())
            .or_default()
            .push(ModelSample {
                confidence: metrics.confidence_score,
                quality: metrics.data_quality_score,
                processing_time_ms: metrics.processing_time_ms,
                success: metrics.success,
            });

        if state.processing_times.len() >= self.config.processing_time_window {
            state.processing_times.pop_front();
        }
        state.processing_times.push_back(metrics.processing_time_ms);

        if !metrics.success {
            let key = metrics
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown_error".to_string());
            *state.error_counts.entry(key).or_insert(0) += 1;
        }

        if metrics.processing_time_ms > self.config.slow_request_threshold_ms {
            warn!(
                sku = %metrics.sku,
                processing_time_ms = metrics.processing_time_ms,
                "slow forecast request"
            );
        }
        if metrics.success && metrics.confidence_score < self.config.low_confidence_threshold {
            warn!(
                sku = %metrics.sku,
                confidence_score = metrics.confidence_score,
                "low confidence forecast"
            );
        }
        if metrics.success && metrics.data_quality_score < self.config.low_quality_threshold {
            warn!(
                sku = %metrics.sku,
                data_quality_score = metrics.data_quality_score,
                "low data quality"
            );
        }

        state.history.push_back(metrics);
    }

    /// Aggregate the requests recorded within the last `window_hours`.
    /// `None` when the window holds no requests.
    pub fn summarize(&self, window_hours: i64) -> Option<PerformanceSummary> {
        let cutoff = Utc::now() - Duration::hours(window_hours);
        let state = self.state.lock().expect("metrics mutex poisoned");

        let recent: Vec<&ForecastMetrics> = state
            .history
            .iter()
            .filter(|m| m.timestamp >= cutoff)
            .collect();
        if recent.is_empty() {
            return None;
        }

        let total_requests = recent.len();
        let successful: Vec<&&ForecastMetrics> = recent.iter().filter(|m| m.success).collect();
        let successful_requests = successful.len();

        let processing_times: Vec<f64> = recent.iter().map(|m| m.processing_time_ms).collect();
        let performance = ProcessingTimeStats {
            avg_processing_time_ms: processing_times.iter().sum::<f64>()
                / processing_times.len() as f64,
            max_processing_time_ms: processing_times.iter().fold(f64::MIN, |a, &b| a.max(b)),
            min_processing_time_ms: processing_times.iter().fold(f64::MAX, |a, &b| a.min(b)),
            slow_requests: processing_times
                .iter()
                .filter(|&&t| t > self.config.slow_request_threshold_ms)
                .count(),
        };

        let forecast_quality = if successful.is_empty() {
            ForecastQualityStats {
                avg_confidence_score: 0.0,
                avg_data_quality_score: 0.0,
                low_confidence_forecasts: 0,
                low_quality_data: 0,
            }
        } else {
            ForecastQualityStats {
                avg_confidence_score: successful.iter().map(|m| m.confidence_score).sum::<f64>()
                    / successful.len() as f64,
                avg_data_quality_score: successful
                    .iter()
                    .map(|m| m.data_quality_score)
                    .sum::<f64>()
                    / successful.len() as f64,
                low_confidence_forecasts: successful
                    .iter()
                    .filter(|m| m.confidence_score < self.config.low_confidence_threshold)
                    .count(),
                low_quality_data: successful
                    .iter()
                    .filter(|m| m.data_quality_score < self.config.low_quality_threshold)
                    .count(),
            }
        };

        let mut model_usage: HashMap<String, u64> = HashMap::new();
        for metrics in &successful {
            *model_usage.entry(metrics.model_used.clone()).or_insert(0) += 1;
        }

        let mut recent_errors: HashMap<String, u64> = HashMap::new();
        for metrics in &recent {
            if !metrics.success {
                if let Some(message) = &metrics.error_message {
                    *recent_errors.entry(message.clone()).or_insert(0) += 1;
                }
            }
        }

        Some(PerformanceSummary {
            time_period_hours: window_hours,
            total_requests,
            successful_requests,
            failed_requests: total_requests - successful_requests,
            success_rate: successful_requests as f64 / total_requests as f64,
            performance,
            forecast_quality,
            model_usage,
            recent_errors,
        })
    }

    /// Per-model aggregates for every model with at least one successful
    /// run.
    pub fn compare_models(&self) -> HashMap<String, ModelPerformance> {
        let state = self.state.lock().expect("metrics mutex poisoned");
        let mut comparison = HashMap::new();

        for (model_name, samples) in &state.model_performance {
            let successful: Vec<&ModelSample> = samples.iter().filter(|s| s.success).collect();
            if successful.is_empty() {
                continue;
            }

            let confidences: Vec<f64> = successful.iter().map(|s| s.confidence).collect();
            let qualities: Vec<f64> = successful.iter().map(|s| s.quality).collect();

            comparison.insert(
                model_name.clone(),
                ModelPerformance {
                    total_runs: samples.len(),
                    successful_runs: successful.len(),
                    success_rate: successful.len() as f64 / samples.len() as f64,
                    avg_confidence: confidences.iter().sum::<f64>() / confidences.len() as f64,
                    avg_quality: qualities.iter().sum::<f64>() / qualities.len() as f64,
                    avg_processing_time_ms: successful
                        .iter()
                        .map(|s| s.processing_time_ms)
                        .sum::<f64>()
                        / successful.len() as f64,
                    confidence_std: sample_std(&confidences),
                    quality_std: sample_std(&qualities),
                },
            );
        }

        comparison
    }

    /// Snapshot of the full rolling history, oldest first.
    pub fn export(&self) -> Vec<ForecastMetrics> {
        let state = self.state.lock().expect("metrics mutex poisoned");
        state.history.iter().cloned().collect()
    }

    /// JSON rendering of [`export`](Self::export). Serialization failures
    /// propagate; there is no further fallback.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export())
    }

    /// Reset every internal collection.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("metrics mutex poisoned");
        state.history.clear();
        state.model_performance.clear();
        state.error_counts.clear();
        state.processing_times.clear();
        info!("all forecast metrics cleared");
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Wall-clock scope for one forecast request. Started before validation and
/// consumed exactly once on whichever path the request exits through, so a
/// failure still leaves one record in the ledger.
#[derive(Debug)]
pub struct RequestTimer {
    sku: String,
    user_id: String,
    started: Instant,
}

impl RequestTimer {
    pub fn start(sku: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            user_id: user_id.into(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Build the outcome record for this request and hand it to the
    /// monitor. Consumes the timer: each request records exactly once.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        self,
        monitor: &PerformanceMonitor,
        model_used: &str,
        data_points: usize,
        forecast_days: u32,
        confidence_score: f64,
        data_quality_score: f64,
        success: bool,
        error_message: Option<String>,
    ) {
        let processing_time_ms = self.elapsed_ms();
        monitor.record(ForecastMetrics {
            timestamp: Utc::now(),
            sku: self.sku,
            user_id: self.user_id,
            model_used: model_used.to_string(),
            processing_time_ms,
            data_points,
            forecast_days,
            confidence_score,
            data_quality_score,
            success,
            error_message,
        });
    }
}
