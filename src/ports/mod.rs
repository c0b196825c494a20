//! Port traits: the seams between the core and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod forecast_port;
pub mod observer_port;
pub mod regime_port;
pub mod report_port;
pub mod risk_port;
