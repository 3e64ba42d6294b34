use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_MIN_DATA_POINTS: usize = 14;
const DEFAULT_MIN_DAYS_SPAN: i64 = 14;
const DEFAULT_CONFIDENCE_MARGIN: f64 = 1.1;
const DEFAULT_SAFETY_STOCK_RATIO: f64 = 0.2;
const DEFAULT_MIN_ORDER_RATIO: f64 = 0.1;
const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;
const DEFAULT_PROCESSING_TIME_WINDOW: usize = 100;
const DEFAULT_SLOW_REQUEST_THRESHOLD_MS: f64 = 5000.0;
const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;
const DEFAULT_LOW_QUALITY_THRESHOLD: f64 = 0.5;

/// Admissibility thresholds for incoming sales history.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Minimum number of observations required for forecasting
    #[serde(default = "default_min_data_points")]
    #[validate(custom = "validate_min_data_points")]
    pub min_data_points: usize,

    /// Minimum span in days between first and last observation
    #[serde(default = "default_min_days_span")]
    #[validate(range(min = 1))]
    pub min_days_span: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_data_points: default_min_data_points(),
            min_days_span: default_min_days_span(),
        }
    }
}

/// Model-selection thresholds.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Factor one candidate's confidence must exceed the other's by to win
    /// outright (strict comparison)
    #[serde(default = "default_confidence_margin")]
    #[validate(custom = "validate_confidence_margin")]
    pub confidence_margin: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            confidence_margin: default_confidence_margin(),
        }
    }
}

/// Reorder arithmetic ratios.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DecisionConfig {
    /// Safety stock as a fraction of forecast demand
    #[serde(default = "default_safety_stock_ratio")]
    #[validate(custom = "validate_unit_ratio")]
    pub safety_stock_ratio: f64,

    /// Minimum order as a fraction of forecast demand
    #[serde(default = "default_min_order_ratio")]
    #[validate(custom = "validate_unit_ratio")]
    pub min_order_ratio: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            safety_stock_ratio: default_safety_stock_ratio(),
            min_order_ratio: default_min_order_ratio(),
        }
    }
}

/// Capacity and advisory thresholds for the performance monitor.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Rolling history capacity (oldest evicted first)
    #[serde(default = "default_max_history_size")]
    #[validate(custom = "validate_nonzero_capacity")]
    pub max_history_size: usize,

    /// Size of the recent processing-time window
    #[serde(default = "default_processing_time_window")]
    #[validate(custom = "validate_nonzero_capacity")]
    pub processing_time_window: usize,

    /// Requests slower than this log an advisory warning
    #[serde(default = "default_slow_request_threshold_ms")]
    pub slow_request_threshold_ms: f64,

    /// Successful forecasts below this confidence log an advisory warning
    #[serde(default = "default_low_confidence_threshold")]
    #[validate(custom = "validate_unit_ratio")]
    pub low_confidence_threshold: f64,

    /// Successful forecasts below this data quality log an advisory warning
    #[serde(default = "default_low_quality_threshold")]
    #[validate(custom = "validate_unit_ratio")]
    pub low_quality_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_history_size: default_max_history_size(),
            processing_time_window: default_processing_time_window(),
            slow_request_threshold_ms: default_slow_request_threshold_ms(),
            low_confidence_threshold: default_low_confidence_threshold(),
            low_quality_threshold: default_low_quality_threshold(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub validation: ValidationConfig,

    #[serde(default)]
    #[validate]
    pub ensemble: EnsembleConfig,

    #[serde(default)]
    #[validate]
    pub decision: DecisionConfig,

    #[serde(default)]
    #[validate]
    pub monitor: MonitorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            validation: ValidationConfig::default(),
            ensemble: EnsembleConfig::default(),
            decision: DecisionConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/default`, an environment-specific
    /// overlay, and `FORECAST_`-prefixed environment variables, in that
    /// order of precedence.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            env::var("FORECAST_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(Environment::with_prefix("FORECAST").separator("__"))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;

        info!(environment = %config.environment, "configuration loaded");
        Ok(config)
    }
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_min_data_points() -> usize {
    DEFAULT_MIN_DATA_POINTS
}

fn default_min_days_span() -> i64 {
    DEFAULT_MIN_DAYS_SPAN
}

fn default_confidence_margin() -> f64 {
    DEFAULT_CONFIDENCE_MARGIN
}

fn default_safety_stock_ratio() -> f64 {
    DEFAULT_SAFETY_STOCK_RATIO
}

fn default_min_order_ratio() -> f64 {
    DEFAULT_MIN_ORDER_RATIO
}

fn default_max_history_size() -> usize {
    DEFAULT_MAX_HISTORY_SIZE
}

fn default_processing_time_window() -> usize {
    DEFAULT_PROCESSING_TIME_WINDOW
}

fn default_slow_request_threshold_ms() -> f64 {
    DEFAULT_SLOW_REQUEST_THRESHOLD_MS
}

fn default_low_confidence_threshold() -> f64 {
    DEFAULT_LOW_CONFIDENCE_THRESHOLD
}

fn default_low_quality_threshold() -> f64 {
    DEFAULT_LOW_QUALITY_THRESHOLD
}

fn validate_min_data_points(value: usize) -> Result<(), ValidationError> {
    if value < 2 {
        let mut err = ValidationError::new("min_data_points");
        err.message = Some("min_data_points must be at least 2".into());
        return Err(err);
    }
    Ok(())
}

fn validate_confidence_margin(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 1.0 {
        let mut err = ValidationError::new("confidence_margin");
        err.message = Some("confidence_margin must be a finite value of at least 1.0".into());
        return Err(err);
    }
    Ok(())
}

fn validate_unit_ratio(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 || value > 1.0 {
        let mut err = ValidationError::new("unit_ratio");
        err.message = Some("value must be a finite value between 0.0 and 1.0".into());
        return Err(err);
    }
    Ok(())
}

fn validate_nonzero_capacity(value: usize) -> Result<(), ValidationError> {
    if value == 0 {
        let mut err = ValidationError::new("capacity");
        err.message = Some("capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}
