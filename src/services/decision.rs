use crate::config::DecisionConfig;
use crate::ml::forecasting::ForecastResult;
use crate::models::{ItemForecast, StockoutRisk};

/// Turns an ensemble forecast plus current stock and supplier lead time into
/// a concrete reorder recommendation.
///
/// All operations are pure arithmetic over the caller's inputs; the engine
/// holds nothing but its ratios.
#[derive(Debug, Clone)]
pub struct InventoryDecisionEngine {
    safety_stock_ratio: f64,
    min_order_ratio: f64,
}

impl Default for InventoryDecisionEngine {
    fn default() -> Self {
        Self::new(&DecisionConfig::default())
    }
}

impl InventoryDecisionEngine {
    pub fn new(config: &DecisionConfig) -> Self {
        Self {
            safety_stock_ratio: config.safety_stock_ratio,
            min_order_ratio: config.min_order_ratio,
        }
    }

    /// Expected demand while a reorder is in transit.
    ///
    /// Lead times beyond the forecast horizon extrapolate from the mean
    /// daily prediction; shorter lead times sum the head of the forecast.
    pub fn compute_lead_time_demand(
        &self,
        predictions: &[f64],
        lead_time_days: u32,
        horizon_days: u32,
    ) -> u32 {
        if lead_time_days == 0 {
            return 0;
        }

        if lead_time_days > horizon_days {
            if predictions.is_empty() {
                return 0;
            }
            let daily_average = predictions.iter().sum::<f64>() / predictions.len() as f64;
            return (daily_average * f64::from(lead_time_days)).round() as u32;
        }

        let covered = (lead_time_days as usize).min(predictions.len());
        predictions[..covered].iter().sum::<f64>().round() as u32
    }

    /// Recommended order quantity: zero when current stock already covers
    /// forecast demand, lead-time demand and safety stock; otherwise the
    /// shortfall, floored by a minimum economic order size.
    pub fn compute_reorder_quantity(
        &self,
        current_stock: u32,
        forecast_demand: u32,
        lead_time_demand: u32,
    ) -> u32 {
        let safety_stock = (self.safety_stock_ratio * f64::from(forecast_demand)).round() as u32;
        let total_demand = forecast_demand + lead_time_demand + safety_stock;

        if current_stock >= total_demand {
            return 0;
        }

        let reorder_quantity = total_demand - current_stock;
        let min_order =
            ((self.min_order_ratio * f64::from(forecast_demand)).round() as u32).max(1);
        reorder_quantity.max(min_order)
    }

    /// Walk the cumulative forecast to find the first day demand outruns
    /// the stock on hand.
    pub fn compute_stockout_risk(&self, current_stock: u32, predictions: &[f64]) -> StockoutRisk {
        let mut cumulative = 0.0;
        for (index, prediction) in predictions.iter().enumerate() {
            cumulative += prediction;
            if cumulative > f64::from(current_stock) {
                let stockout_day = index + 1;
                return StockoutRisk {
                    at_risk: true,
                    stockout_day: Some(stockout_day),
                    days_of_stock_covered: stockout_day - 1,
                };
            }
        }
        StockoutRisk {
            at_risk: false,
            stockout_day: None,
            days_of_stock_covered: predictions.len(),
        }
    }

    /// Compose the decision arithmetic into the terminal per-item output.
    pub fn build_item_forecast(
        &self,
        sku: &str,
        current_stock: u32,
        ensemble: &ForecastResult,
        lead_time_days: u32,
        horizon_days: u32,
        data_quality_score: f64,
    ) -> ItemForecast {
        let forecast_total = ensemble.predictions.iter().sum::<f64>().round() as u32;
        let lead_time_demand =
            self.compute_lead_time_demand(&ensemble.predictions, lead_time_days, horizon_days);
        let recommended_order =
            self.compute_reorder_quantity(current_stock, forecast_total, lead_time_demand);

        ItemForecast {
            sku: sku.to_string(),
            current_stock,
            forecast_7_day: forecast_total,
            recommended_order,
            confidence_score: ensemble.confidence_score,
            trend: ensemble.trend,
            seasonality_detected: ensemble.seasonality_detected,
            lead_time_factored: lead_time_days,
            model_used: ensemble.model_name.clone(),
            data_quality_score,
        }
    }
}
