//! Persistence of run results.
//!
//! One pretty-printed JSON record per GA run, plus a summary CSV with one row
//! per run and, when a reference optimum is known, the percent error.

use crate::error::{Result, TspError};
use crate::ga::{CrossoverKind, GaResult};
use crate::metrics::percent_error;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Writes a result record as pretty JSON, creating parent directories.
pub fn write_result_json(result: &GaResult, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// Reads a result record back.
pub fn read_result_json(path: impl AsRef<Path>) -> Result<GaResult> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// One row of the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub instance: String,
    pub seed: u64,
    #[serde(rename = "N")]
    pub population_size: usize,
    #[serde(rename = "maxIter")]
    pub max_iterations: usize,
    pub crossover: CrossoverKind,
    pub pmut: f64,
    pub elitism: f64,
    pub best_cost: f64,
    pub cities: usize,
    pub opt: Option<f64>,
    pub pct_error: Option<f64>,
    pub time_s: f64,
    pub file_json: String,
}

impl SummaryRow {
    /// Builds a row from a result. `pct_error` is filled only when `optimum`
    /// is given and positive.
    pub fn from_result(
        instance: &str,
        result: &GaResult,
        file_json: &str,
        optimum: Option<f64>,
    ) -> Self {
        let pct_error = optimum
            .map(|opt| percent_error(result.best.cost, opt))
            .filter(|e| !e.is_nan());
        Self {
            instance: instance.to_string(),
            seed: result.params.seed,
            population_size: result.params.population_size,
            max_iterations: result.params.max_iterations,
            crossover: result.params.crossover,
            pmut: result.params.pmut,
            elitism: result.params.elitism,
            best_cost: result.best.cost,
            cities: result.best.tour.len(),
            opt: optimum,
            pct_error,
            time_s: result.time_s,
            file_json: file_json.to_string(),
        }
    }
}

/// Writes summary rows as CSV with a header line.
///
/// # Errors
/// [`TspError::InvalidConfiguration`] when `rows` is empty.
pub fn write_summary_csv(rows: &[SummaryRow], path: impl AsRef<Path>) -> Result<()> {
    if rows.is_empty() {
        return Err(TspError::config("no rows to write in the summary"));
    }
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
