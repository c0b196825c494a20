//! epitome: calibrated quantile forecasts turned into risk-aware trading
//! signals, evaluated by a walk-forward backtest.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the command line in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
