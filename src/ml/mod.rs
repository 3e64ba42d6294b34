/*!
 * # Forecasting Models Module
 *
 * This module defines the contract between the decision pipeline and the
 * model-fitting engines (ARIMA-family, Prophet-family) that produce raw
 * demand predictions. The engines themselves live outside this crate; what
 * lives here is the shape of their output, the trait they implement, and
 * the moving-average fallback used when no fitted model is available.
 */

pub mod forecasting;

pub use forecasting::{ForecastResult, Forecaster, MovingAverageForecaster, Trend};
