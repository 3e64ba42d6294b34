use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, instrument};
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::metrics::{ModelPerformance, PerformanceMonitor, PerformanceSummary, RequestTimer};
use crate::ml::forecasting::Forecaster;
use crate::models::{
    BatchForecastRequest, BatchForecastResponse, FailedItem, ForecastRequest, ForecastResponse,
    ItemForecast, StockoutRisk,
};
use crate::services::decision::InventoryDecisionEngine;
use crate::services::ensemble::EnsembleSelector;
use crate::services::validation::{parse_series, SeriesValidator};

/// Model tag recorded when a request never reaches the forecasters.
const VALIDATION_FAILED_MODEL: &str = "validation_failed";
/// Model tag recorded when request processing failed unexpectedly.
const EXCEPTION_MODEL: &str = "exception";

/// Orchestrates one forecast request end to end: admissibility check, the
/// two concurrent model fits, ensemble selection, reorder arithmetic and the
/// unconditional metrics record.
///
/// The service holds no per-request state; the shared
/// [`PerformanceMonitor`] is the only mutable collaborator.
#[derive(Clone)]
pub struct ForecastService {
    validator: SeriesValidator,
    selector: EnsembleSelector,
    engine: InventoryDecisionEngine,
    primary_forecaster: Arc<dyn Forecaster>,
    secondary_forecaster: Arc<dyn Forecaster>,
    monitor: Arc<PerformanceMonitor>,
}

impl ForecastService {
    /// `primary_forecaster` is the ARIMA-family engine, `secondary_forecaster`
    /// the Prophet-family engine; the asymmetric selection rule treats the
    /// secondary as the seasonality-aware candidate.
    pub fn new(
        config: &AppConfig,
        primary_forecaster: Arc<dyn Forecaster>,
        secondary_forecaster: Arc<dyn Forecaster>,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            validator: SeriesValidator::new(&config.validation),
            selector: EnsembleSelector::new(&config.ensemble),
            engine: InventoryDecisionEngine::new(&config.decision),
            primary_forecaster,
            secondary_forecaster,
            monitor,
        }
    }

    /// Generate a forecast and reorder recommendation for a single item.
    ///
    /// Never fails outright: every outcome — including inadmissible input
    /// and unexpected processing errors — comes back as a structured
    /// response, and exactly one metrics record is written per call.
    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn generate_forecast(&self, request: &ForecastRequest) -> ForecastResponse {
        let timer = RequestTimer::start(&request.sku, &request.user_id);
        info!(user_id = %request.user_id, "generating forecast");

        if let Err(err) = request.validate() {
            let message = ServiceError::from(err).to_string();
            timer.record(
                &self.monitor,
                VALIDATION_FAILED_MODEL,
                request.sales_history.len(),
                request.forecast_days,
                0.0,
                0.0,
                false,
                Some(message.clone()),
            );
            return ForecastResponse::failure(message, Vec::new());
        }

        let validation = self.validator.validate(&request.sales_history);
        if !validation.is_valid {
            let message = validation
                .error_message
                .unwrap_or_else(|| "validation failed".to_string());
            timer.record(
                &self.monitor,
                VALIDATION_FAILED_MODEL,
                request.sales_history.len(),
                request.forecast_days,
                0.0,
                validation.data_quality_score,
                false,
                Some(message.clone()),
            );
            return if validation.insufficient_data {
                ForecastResponse::insufficient_data(message, validation.warnings)
            } else {
                ForecastResponse::failure(message, validation.warnings)
            };
        }

        match self
            .process_validated(request, validation.data_quality_score)
            .await
        {
            Ok((forecast, stockout_risk)) => {
                timer.record(
                    &self.monitor,
                    &forecast.model_used,
                    request.sales_history.len(),
                    request.forecast_days,
                    forecast.confidence_score,
                    forecast.data_quality_score,
                    true,
                    None,
                );
                ForecastResponse::success(forecast, stockout_risk, validation.warnings)
            }
            Err(err) => {
                let message = format!("Forecast processing failed: {err}");
                error!(error = %err, "forecast processing failed");
                timer.record(
                    &self.monitor,
                    EXCEPTION_MODEL,
                    request.sales_history.len(),
                    request.forecast_days,
                    0.0,
                    validation.data_quality_score,
                    false,
                    Some(message.clone()),
                );
                ForecastResponse::failure(message, validation.warnings)
            }
        }
    }

    /// Generate forecasts for a batch of items with per-item failure
    /// isolation: partial results are always returned and every item leaves
    /// its own metrics record.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn generate_batch_forecast(
        &self,
        request: &BatchForecastRequest,
    ) -> BatchForecastResponse {
        info!(
            user_id = %request.user_id,
            items = request.items.len(),
            "generating batch forecast"
        );

        let mut response = BatchForecastResponse::default();
        for item_request in &request.items {
            let item_response = self.generate_forecast(item_request).await;

            for warning in &item_response.data_quality_warnings {
                if !response.data_quality_warnings.contains(warning) {
                    response.data_quality_warnings.push(warning.clone());
                }
            }

            if item_response.success {
                if let Some(forecast) = item_response.forecast {
                    response.forecasts.push(forecast);
                }
            } else if item_response.insufficient_data {
                response
                    .insufficient_data_items
                    .push(item_request.sku.clone());
            } else {
                response.failed_items.push(FailedItem {
                    sku: item_request.sku.clone(),
                    error: item_response
                        .error_message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                });
            }
        }
        response
    }

    async fn process_validated(
        &self,
        request: &ForecastRequest,
        data_quality_score: f64,
    ) -> Result<(ItemForecast, StockoutRisk), ServiceError> {
        let series = parse_series(&request.sales_history)?;
        let horizon_days = request.forecast_days;

        // Both fits run concurrently; their outputs are combined only after
        // both complete.
        let (candidate_a, candidate_b) = tokio::join!(
            self.primary_forecaster.fit_and_forecast(&series, horizon_days),
            self.secondary_forecaster.fit_and_forecast(&series, horizon_days),
        );

        for candidate in [&candidate_a, &candidate_b] {
            if candidate.predictions.len() != horizon_days as usize {
                return Err(ServiceError::InternalError(format!(
                    "model '{}' returned {} predictions for a {}-day horizon",
                    candidate.model_name,
                    candidate.predictions.len(),
                    horizon_days
                )));
            }
        }

        let selected = self.selector.select(candidate_a, candidate_b);
        let stockout_risk = self
            .engine
            .compute_stockout_risk(request.current_stock, &selected.predictions);
        let forecast = self.engine.build_item_forecast(
            &request.sku,
            request.current_stock,
            &selected,
            request.lead_time_days,
            horizon_days,
            data_quality_score,
        );
        Ok((forecast, stockout_risk))
    }

    /// Aggregate request outcomes recorded in the last `window_hours`.
    pub fn performance_summary(&self, window_hours: i64) -> Option<PerformanceSummary> {
        self.monitor.summarize(window_hours)
    }

    /// Per-model aggregates across the monitor's ledger.
    pub fn model_comparison(&self) -> HashMap<String, ModelPerformance> {
        self.monitor.compare_models()
    }

    /// JSON snapshot of the full metrics history.
    pub fn export_metrics(&self) -> Result<String, ServiceError> {
        self.monitor.export_json().map_err(ServiceError::from)
    }

    /// Drop all recorded metrics.
    pub fn clear_metrics(&self) {
        self.monitor.clear();
    }
}
