//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::ewma_risk::EwmaRiskEstimator;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::gaussian_regime::GaussianRegimeFilter;
use crate::adapters::random_walk_forecast::RandomWalkForecaster;
use crate::adapters::time_limited::TimeLimited;
use crate::adapters::tracing_observer::TracingObserver;
use crate::domain::backtest::{run_backtest, ActionCounts, BacktestConfig};
use crate::domain::config_validation::{self, ProviderSettings};
use crate::domain::error::EpitomeError;
use crate::domain::metrics::PerformanceMetrics;
use crate::domain::signal::{Decision, SignalConfig, SignalPolicy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::forecast_port::ForecastProvider;
use crate::ports::regime_port::RegimeProvider;
use crate::ports::report_port::ReportPort;
use crate::ports::risk_port::RiskProvider;

#[derive(Parser, Debug)]
#[command(
    name = "epitome",
    about = "Calibrated quantile signals and walk-forward backtests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Produce a decision for the latest price
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: Option<PathBuf>,
        #[arg(long)]
        horizon: Option<usize>,
        #[arg(long)]
        alpha: Option<f64>,
    },
    /// Run a walk-forward backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signal {
            config,
            prices,
            horizon,
            alpha,
        } => run_signal(&config, prices.as_deref(), horizon, alpha),
        Command::Backtest {
            config,
            prices,
            output,
        } => run_backtest_command(&config, prices.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: EpitomeError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

/// The three reference providers, optionally wrapped in a per-call time limit.
pub struct Providers {
    pub forecast: Box<dyn ForecastProvider>,
    pub regime: Box<dyn RegimeProvider>,
    pub risk: Box<dyn RiskProvider>,
}

impl Providers {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let forecast = RandomWalkForecaster::new();
        let regime = GaussianRegimeFilter::with_stay_prob(settings.regime_stay_prob);
        let risk = EwmaRiskEstimator::new(settings.ewma_lambda);

        match settings.timeout {
            Some(limit) => Providers {
                forecast: Box::new(TimeLimited::new(Arc::new(forecast), limit)),
                regime: Box::new(TimeLimited::new(Arc::new(regime), limit)),
                risk: Box::new(TimeLimited::new(Arc::new(risk), limit)),
            },
            None => Providers {
                forecast: Box::new(forecast),
                regime: Box::new(regime),
                risk: Box::new(risk),
            },
        }
    }
}

/// `[signal]` section with command-line overrides applied.
pub fn build_signal_config(
    adapter: &dyn ConfigPort,
    horizon: Option<usize>,
    alpha: Option<f64>,
) -> Result<SignalConfig, EpitomeError> {
    let mut cfg = config_validation::signal_config(adapter)?;
    if let Some(h) = horizon {
        cfg.horizon = h;
    }
    if let Some(a) = alpha {
        cfg.alpha = a;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, EpitomeError> {
    config_validation::backtest_config(adapter)
}

/// A command-line path is used as given; `[data] prices` is resolved
/// relative to the config file's directory.
pub fn resolve_prices_path(
    config_path: &Path,
    adapter: &dyn ConfigPort,
    cli_prices: Option<&Path>,
) -> Result<PathBuf, EpitomeError> {
    if let Some(p) = cli_prices {
        return Ok(p.to_path_buf());
    }
    let configured = config_validation::prices_path(adapter)?;
    Ok(relative_to_config(config_path, &configured))
}

/// Equity curve destination: `--output` as given, else `[report] output`
/// relative to the config file's directory, else none.
pub fn resolve_report_path(
    config_path: &Path,
    adapter: &dyn ConfigPort,
    cli_output: Option<&Path>,
) -> Option<PathBuf> {
    match cli_output {
        Some(p) if !p.as_os_str().is_empty() => Some(p.to_path_buf()),
        _ => adapter
            .get_value("report", "output")
            .map(|configured| relative_to_config(config_path, &configured)),
    }
}

fn relative_to_config(config_path: &Path, value: &str) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(value)
}

fn run_signal(
    config_path: &Path,
    prices: Option<&Path>,
    horizon: Option<usize>,
    alpha: Option<f64>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match signal_pipeline(config_path, &adapter, prices, horizon, alpha) {
        Ok(decision) => match serde_json::to_string_pretty(&decision) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(e.into()),
        },
        Err(e) => fail(e),
    }
}

pub fn signal_pipeline(
    config_path: &Path,
    adapter: &dyn ConfigPort,
    prices: Option<&Path>,
    horizon: Option<usize>,
    alpha: Option<f64>,
) -> Result<Decision, EpitomeError> {
    let cfg = build_signal_config(adapter, horizon, alpha)?;
    let settings = config_validation::provider_settings(adapter)?;
    let prices_path = resolve_prices_path(config_path, adapter, prices)?;

    eprintln!("Loading prices from {}", prices_path.display());
    let series = CsvPriceAdapter.load_prices(&prices_path.to_string_lossy())?;
    eprintln!("  {} prices", series.len());

    let providers = Providers::from_settings(&settings);
    let observer = TracingObserver;
    let policy = SignalPolicy::new(
        providers.forecast.as_ref(),
        providers.regime.as_ref(),
        providers.risk.as_ref(),
    )
    .with_observer(&observer);

    eprintln!(
        "Deciding: horizon {}, alpha {}, gate_frac {}",
        cfg.horizon, cfg.alpha, cfg.gate_frac
    );
    policy.decide(series.as_window(), &cfg)
}

/// JSON summary printed by the `backtest` subcommand.
#[derive(Debug, Serialize)]
pub struct BacktestSummary {
    pub metrics: PerformanceMetrics,
    pub counts: ActionCounts,
    pub config: BacktestConfig,
    pub final_equity: f64,
    pub report: Option<PathBuf>,
}

fn run_backtest_command(
    config_path: &Path,
    prices: Option<&Path>,
    output: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match backtest_pipeline(config_path, &adapter, prices, output) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(e.into()),
        },
        Err(e) => fail(e),
    }
}

pub fn backtest_pipeline(
    config_path: &Path,
    adapter: &dyn ConfigPort,
    prices: Option<&Path>,
    output: Option<&Path>,
) -> Result<BacktestSummary, EpitomeError> {
    let cfg = build_backtest_config(adapter)?;
    let settings = config_validation::provider_settings(adapter)?;
    let prices_path = resolve_prices_path(config_path, adapter, prices)?;

    eprintln!("Loading prices from {}", prices_path.display());
    let series = CsvPriceAdapter.load_prices(&prices_path.to_string_lossy())?;

    let providers = Providers::from_settings(&settings);
    let observer = TracingObserver;
    let policy = SignalPolicy::new(
        providers.forecast.as_ref(),
        providers.regime.as_ref(),
        providers.risk.as_ref(),
    )
    .with_observer(&observer);

    eprintln!(
        "Running backtest: {} prices, from index {}, stride {}",
        series.len(),
        cfg.first_index(),
        cfg.stride
    );
    let result = run_backtest(&policy, &series, &cfg)?;

    let m = &result.metrics;
    eprintln!("\n=== Results ===");
    eprintln!("Steps:            {}", m.n_steps);
    eprintln!(
        "Long/Short/Flat:  {}/{}/{}",
        result.counts.long, result.counts.short, result.counts.flat
    );
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("CAGR:             {:.2}%", m.cagr * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino);
    eprintln!("Max Drawdown:     {:.1}%", m.max_drawdown * 100.0);
    eprintln!("Hit Rate:         {:.1}%", m.hit_rate * 100.0);

    let report = match resolve_report_path(config_path, adapter, output) {
        Some(path) => {
            CsvReportAdapter::new().write(&result, &path)?;
            eprintln!("\nEquity curve written to: {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(BacktestSummary {
        final_equity: result.final_equity(),
        metrics: result.metrics,
        counts: result.counts,
        config: result.config,
        report,
    })
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match config_validation::validate_all(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
