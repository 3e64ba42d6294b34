use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ml::forecasting::Trend;
use crate::services::validation::MIN_DATA_POINTS;

/// A single observed sale as submitted by callers. Dates arrive as
/// `YYYY-MM-DD` strings and are parsed during validation so that a bad date
/// surfaces as a structured failure rather than a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesDataPoint {
    pub date: String,
    pub quantity_sold: u32,
}

impl SalesDataPoint {
    pub fn new(date: impl Into<String>, quantity_sold: u32) -> Self {
        Self {
            date: date.into(),
            quantity_sold,
        }
    }
}

/// A parsed, date-sorted observation. Immutable once ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub quantity: u32,
}

/// Input for a single-item forecast.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForecastRequest {
    pub user_id: String,
    #[validate(length(min = 1))]
    pub sku: String,
    pub sales_history: Vec<SalesDataPoint>,
    pub current_stock: u32,
    #[serde(default = "default_lead_time_days")]
    #[validate(range(min = 1))]
    pub lead_time_days: u32,
    #[serde(default = "default_forecast_days")]
    #[validate(range(min = 1, max = 30))]
    pub forecast_days: u32,
}

fn default_lead_time_days() -> u32 {
    7
}

fn default_forecast_days() -> u32 {
    7
}

/// Terminal output of one successful forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemForecast {
    pub sku: String,
    pub current_stock: u32,
    pub forecast_7_day: u32,
    pub recommended_order: u32,
    pub confidence_score: f64,
    pub trend: Trend,
    pub seasonality_detected: bool,
    pub lead_time_factored: u32,
    pub model_used: String,
    pub data_quality_score: f64,
}

/// Stock coverage timeline derived from the cumulative forecast demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockoutRisk {
    pub at_risk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stockout_day: Option<usize>,
    pub days_of_stock_covered: usize,
}

/// Outcome of a single-item forecast request. `success == false` carries a
/// human-readable message; `insufficient_data` distinguishes "send more
/// history" from genuine processing failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ItemForecast>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub insufficient_data: bool,
    #[serde(default)]
    pub data_quality_warnings: Vec<String>,
    #[serde(default = "default_minimum_data_points")]
    pub minimum_data_points_required: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stockout_risk: Option<StockoutRisk>,
}

fn default_minimum_data_points() -> usize {
    MIN_DATA_POINTS
}

impl ForecastResponse {
    pub fn success(
        forecast: ItemForecast,
        stockout_risk: StockoutRisk,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            forecast: Some(forecast),
            success: true,
            error_message: None,
            insufficient_data: false,
            data_quality_warnings: warnings,
            minimum_data_points_required: MIN_DATA_POINTS,
            stockout_risk: Some(stockout_risk),
        }
    }

    pub fn failure(message: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            forecast: None,
            success: false,
            error_message: Some(message.into()),
            insufficient_data: false,
            data_quality_warnings: warnings,
            minimum_data_points_required: MIN_DATA_POINTS,
            stockout_risk: None,
        }
    }

    pub fn insufficient_data(message: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            insufficient_data: true,
            ..Self::failure(message, warnings)
        }
    }
}

/// Input for a multi-item forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchForecastRequest {
    pub user_id: String,
    pub items: Vec<ForecastRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub sku: String,
    pub error: String,
}

/// Partial results are always returned: one item's failure never suppresses
/// its siblings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchForecastResponse {
    pub forecasts: Vec<ItemForecast>,
    pub insufficient_data_items: Vec<String>,
    pub failed_items: Vec<FailedItem>,
    pub data_quality_warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn request_with(lead_time_days: u32, forecast_days: u32) -> ForecastRequest {
        ForecastRequest {
            user_id: "user-1".to_string(),
            sku: "SKU-100".to_string(),
            sales_history: vec![SalesDataPoint::new("2025-01-01", 4)],
            current_stock: 25,
            lead_time_days,
            forecast_days,
        }
    }

    #[test]
    fn request_defaults_apply_on_deserialization() {
        let json = r#"{
            "user_id": "u1",
            "sku": "SKU-1",
            "sales_history": [],
            "current_stock": 10
        }"#;
        let request: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.lead_time_days, 7);
        assert_eq!(request.forecast_days, 7);
    }

    #[test]
    fn forecast_days_bounds_are_enforced() {
        assert!(request_with(7, 7).validate().is_ok());
        assert!(request_with(0, 7).validate().is_err());
        assert!(request_with(7, 0).validate().is_err());
        assert!(request_with(7, 31).validate().is_err());
    }

    #[test]
    fn insufficient_data_response_sets_flag_and_minimum() {
        let response = ForecastResponse::insufficient_data("too little history", vec![]);
        assert!(!response.success);
        assert!(response.insufficient_data);
        assert_eq!(response.minimum_data_points_required, MIN_DATA_POINTS);
        assert!(response.forecast.is_none());
    }
}
