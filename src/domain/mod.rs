//! Core domain types and logic.

pub mod error;
pub mod numeric;
pub mod price;
pub mod scaling;
pub mod quantiles;
pub mod calibration;
pub mod regime;
pub mod risk;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
