//! Forecast Engine Library
//!
//! Turns a raw per-SKU sales history into a validated, quality-scored,
//! ensemble-selected demand forecast and a concrete reorder recommendation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::metrics::PerformanceMonitor;
use crate::ml::forecasting::Forecaster;
use crate::services::forecasting::ForecastService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub monitor: Arc<PerformanceMonitor>,
    pub forecast_service: Arc<ForecastService>,
}

impl AppState {
    /// Wire the request pipeline: one shared monitor, one forecast service,
    /// both model engines injected by the caller.
    pub fn new(
        config: config::AppConfig,
        primary_forecaster: Arc<dyn Forecaster>,
        secondary_forecaster: Arc<dyn Forecaster>,
    ) -> Self {
        let monitor = Arc::new(PerformanceMonitor::new(config.monitor.clone()));
        let forecast_service = Arc::new(ForecastService::new(
            &config,
            primary_forecaster,
            secondary_forecaster,
            Arc::clone(&monitor),
        ));
        Self {
            config,
            monitor,
            forecast_service,
        }
    }
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::errors::ServiceError;
    pub use crate::metrics::{ForecastMetrics, PerformanceMonitor};
    pub use crate::ml::forecasting::{ForecastResult, Forecaster, Trend};
    pub use crate::models::*;
    pub use crate::services::decision::InventoryDecisionEngine;
    pub use crate::services::ensemble::EnsembleSelector;
    pub use crate::services::forecasting::ForecastService;
    pub use crate::services::validation::SeriesValidator;
    pub use crate::AppState;
}

#[cfg(test)]
mod state_tests {
    use super::*;
    use crate::ml::forecasting::MovingAverageForecaster;

    #[test]
    fn app_state_shares_one_monitor() {
        let state = AppState::new(
            config::AppConfig::default(),
            Arc::new(MovingAverageForecaster::new()),
            Arc::new(MovingAverageForecaster::new()),
        );
        assert_eq!(state.monitor.export().len(), 0);
        state.forecast_service.clear_metrics();
        assert_eq!(state.monitor.export().len(), 0);
    }
}
