//! Equity curve CSV report.
//!
//! One row per evaluation step: `index,timestamp,equity`. The timestamp
//! column is empty when the price series carried none.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EpitomeError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), EpitomeError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_to_io)?;
        wtr.write_record(["index", "timestamp", "equity"])
            .map_err(csv_to_io)?;

        let curve = &result.equity_curve;
        for (i, (index, equity)) in curve.index.iter().zip(&curve.equity).enumerate() {
            let timestamp = curve
                .timestamps
                .as_ref()
                .and_then(|ts| ts.get(i))
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            wtr.write_record([index.to_string(), timestamp, format!("{equity:.10}")])
                .map_err(csv_to_io)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn csv_to_io(err: csv::Error) -> EpitomeError {
    EpitomeError::Io(std::io::Error::other(err))
}
