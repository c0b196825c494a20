//! Domain error types.

use std::fmt;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Forecast,
    Regime,
    Risk,
    Signal,
    Backtest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Forecast => "forecast",
            Stage::Regime => "regime",
            Stage::Risk => "risk",
            Stage::Signal => "signal",
            Stage::Backtest => "backtest",
        };
        f.write_str(name)
    }
}

/// Failure reported by a forecast, regime or risk provider. The policy tags
/// it with the stage it came from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("have {have} observations, need {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

impl ProviderError {
    pub fn at(self, stage: Stage) -> EpitomeError {
        match self {
            ProviderError::InsufficientHistory { have, need } => {
                EpitomeError::InsufficientHistory { stage, have, need }
            }
            other => EpitomeError::ProviderFailure {
                stage,
                reason: other.to_string(),
            },
        }
    }
}

/// Top-level error type for epitome.
#[derive(Debug, thiserror::Error)]
pub enum EpitomeError {
    #[error("insufficient history for {stage}: have {have} observations, need {need}")]
    InsufficientHistory {
        stage: Stage,
        have: usize,
        need: usize,
    },

    #[error("{stage} provider failed: {reason}")]
    ProviderFailure { stage: Stage, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    InvalidConfig {
        section: String,
        key: String,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid price data: {reason}")]
    InvalidData { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EpitomeError {
    pub fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        EpitomeError::InvalidConfig {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_data(reason: impl Into<String>) -> Self {
        EpitomeError::InvalidData {
            reason: reason.into(),
        }
    }
}

impl From<&EpitomeError> for std::process::ExitCode {
    fn from(err: &EpitomeError) -> Self {
        let code: u8 = match err {
            EpitomeError::Io(_) | EpitomeError::Json(_) => 1,
            EpitomeError::ConfigParse { .. }
            | EpitomeError::ConfigMissing { .. }
            | EpitomeError::InvalidConfig { .. } => 2,
            EpitomeError::InvalidData { .. } => 3,
            EpitomeError::InsufficientHistory { .. } => 4,
            EpitomeError::ProviderFailure { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
