//! Aggregation pipeline orchestration.
//!
//! Drives a full analysis run: trial file discovery, reading and decoding,
//! unit conversion into the canonical system, derivation of the corrected
//! quantities, the two-level statistical reduction, and output emission
//! (one CSV per trial plus one JSON summary record).
//!
//! Trials are processed sequentially in lexical filename order. Outputs
//! already written when a later trial fails remain on disk.

use crate::config::Config;
use crate::constants::{
    SYMBOL_CHARGE, SYMBOL_CORRECTED_CHARGE, SYMBOL_K_TP, SYMBOL_PRESSURE, SYMBOL_TEMPERATURE,
};
use crate::models::{output_path_for, Measurement, Summary, Trial, TrialStatistics, Value};
use crate::services::{dosimetry, stats, trial_reader, unit_converter};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parameters for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Directory holding the trial input files
    pub input_dir: PathBuf,
    /// Directory receiving per-trial outputs and the summary
    pub output_dir: PathBuf,
    /// Filename prefix an input file must carry to be analyzed
    pub input_prefix: String,
    /// Prefix prepended to each per-trial output filename
    pub output_prefix: String,
    /// File extension (without dot) of input files
    pub filetype: String,
    /// Filename of the JSON summary artifact
    pub summary_filename: String,
    /// Render a progress bar across trials
    pub show_progress: bool,
}

/// Statistics for one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisStats {
    /// Number of trials analyzed
    pub trials_processed: usize,
    /// Total measurement records across all trials
    pub records_processed: usize,
    /// Within-trial statistics, in trial order
    pub trial_statistics: Vec<TrialStatistics>,
    /// Cross-trial summary; absent on an empty batch
    pub summary: Option<Summary>,
    /// Output files written, in creation order
    pub output_files: Vec<PathBuf>,
}

/// Execute a full analysis run over the trial files in the input directory.
///
/// Zero matching input files is a normal empty-batch outcome: the run ends
/// cleanly with empty statistics and no outputs.
pub fn run_analysis(request: &AnalysisRequest, config: &Config) -> Result<AnalysisStats> {
    info!(
        "Starting preliminary analysis over '{}'",
        request.input_dir.display()
    );

    let trial_files = discover_trial_files(
        &request.input_dir,
        &request.input_prefix,
        &request.filetype,
    )?;

    if trial_files.is_empty() {
        warn!(
            "No input files matching '{}*.{}' in '{}'",
            request.input_prefix,
            request.filetype,
            request.input_dir.display()
        );
        return Ok(AnalysisStats::default());
    }
    info!("Discovered {} trial files", trial_files.len());

    let base_types = config.base_types();
    let target_units = config.canonical_units(&config.files.input.header)?;
    let output_units = config.canonical_units(&config.files.output.header)?;
    let max_k_tp = config.max_k_tp();

    let progress = if request.show_progress {
        create_progress_bar(trial_files.len() as u64, "Processing trials")
    } else {
        ProgressBar::hidden()
    };

    // Read, convert, and derive each trial
    let mut trials = Vec::with_capacity(trial_files.len());
    for path in &trial_files {
        let trial = trial_reader::read_trial(path, &base_types)?;
        trials.push(process_trial(trial, &target_units, max_k_tp)?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    // Within-trial reduction over the corrected charges
    let mut trial_statistics = Vec::with_capacity(trials.len());
    for trial in &trials {
        let statistics = reduce_trial(trial)?;
        debug!(
            "Trial '{}': average={}, std_dev={}, expected_value={}",
            trial.file_name(),
            statistics.average,
            statistics.std_dev,
            statistics.expected_value
        );
        trial_statistics.push(statistics);
    }

    // Across-trial reduction over the per-trial averages
    let averages: Vec<f64> = trial_statistics.iter().map(|s| s.average).collect();
    let summary = Summary {
        average: stats::average(&averages)?,
        std_dev: stats::std_dev(&averages)?,
        expected_value: stats::expected_value(&averages)?,
    };

    // Emit one output file per trial, then the summary record
    let mut output_files = Vec::with_capacity(trials.len() + 1);
    for trial in &trials {
        let output_path = output_path_for(&trial.path, &request.output_dir, &request.output_prefix);
        write_trial_output(&output_path, trial, &config.files.output.header, &output_units)?;
        info!("Output file '{}' created", output_path.display());
        output_files.push(output_path);
    }

    let summary_path = request.output_dir.join(&request.summary_filename);
    write_summary(&summary_path, &summary)?;
    info!("Output file '{}' created", summary_path.display());
    output_files.push(summary_path);

    Ok(AnalysisStats {
        trials_processed: trials.len(),
        records_processed: trials.iter().map(Trial::record_count).sum(),
        trial_statistics,
        summary: Some(summary),
        output_files,
    })
}

/// Enumerate trial files directly inside the input directory (non-recursive)
/// whose name starts with the prefix and whose extension matches the file
/// type, sorted lexically by filename.
pub fn discover_trial_files(
    input_dir: &Path,
    input_prefix: &str,
    filetype: &str,
) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir).map_err(|e| {
        Error::io(
            format!("Failed to read input directory '{}'", input_dir.display()),
            e,
        )
    })?;

    let mut trial_files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::io(
                format!(
                    "Failed to read entry in input directory '{}'",
                    input_dir.display()
                ),
                e,
            )
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let extension_matches = path.extension().and_then(|e| e.to_str()) == Some(filetype);
        if name.starts_with(input_prefix) && extension_matches {
            trial_files.push(path);
        }
    }

    trial_files.sort();

    debug!(
        "Discovered {} trial files in '{}'",
        trial_files.len(),
        input_dir.display()
    );
    Ok(trial_files)
}

/// Convert one trial's records into canonical units and extend each with
/// the derived correction factor and corrected charge.
fn process_trial(
    mut trial: Trial,
    target_units: &HashMap<String, String>,
    max_k_tp: f64,
) -> Result<Trial> {
    let file_name = trial.file_name();
    let source_units = trial.units.clone();

    for measurement in &mut trial.records {
        let converted =
            unit_converter::convert_measurement(measurement, &source_units, target_units)?;
        *measurement = derive_corrected_quantities(converted, max_k_tp, &file_name)?;
    }

    Ok(trial)
}

/// Extend a unit-converted measurement with `k_TP` and `m_corrected`.
///
/// Derived keys are added, never overwritten: an input record that already
/// carries one of them is rejected.
fn derive_corrected_quantities(
    mut measurement: Measurement,
    max_k_tp: f64,
    file: &str,
) -> Result<Measurement> {
    for derived in [SYMBOL_K_TP, SYMBOL_CORRECTED_CHARGE] {
        if measurement.contains_key(derived) {
            return Err(Error::trial_format(
                file,
                format!("Input data already carries derived column '{}'", derived),
            ));
        }
    }

    let temperature = required_quantity(&measurement, SYMBOL_TEMPERATURE, file)?;
    let pressure = required_quantity(&measurement, SYMBOL_PRESSURE, file)?;
    let charge = required_quantity(&measurement, SYMBOL_CHARGE, file)?;

    let k_tp = dosimetry::temperature_pressure_correction(temperature, pressure, max_k_tp)?;
    let corrected = dosimetry::corrected_charge(charge, k_tp, 1.0, 1.0, 1.0);

    measurement.insert(SYMBOL_K_TP.to_string(), Value::Float(k_tp));
    measurement.insert(SYMBOL_CORRECTED_CHARGE.to_string(), Value::Float(corrected));
    Ok(measurement)
}

fn required_quantity(measurement: &Measurement, symbol: &str, file: &str) -> Result<f64> {
    measurement
        .get(symbol)
        .map(Value::as_f64)
        .ok_or_else(|| {
            Error::trial_format(file, format!("Missing required quantity '{}'", symbol))
        })
}

/// Within-trial statistics over the corrected-charge sequence
fn reduce_trial(trial: &Trial) -> Result<TrialStatistics> {
    let file_name = trial.file_name();
    let mut charges = Vec::with_capacity(trial.records.len());
    for measurement in &trial.records {
        charges.push(required_quantity(
            measurement,
            SYMBOL_CORRECTED_CHARGE,
            &file_name,
        )?);
    }

    Ok(TrialStatistics {
        average: stats::average(&charges)?,
        std_dev: stats::std_dev(&charges)?,
        expected_value: stats::expected_value(&charges)?,
    })
}

/// Write one per-trial output file: extended header, canonical units row,
/// then the derived measurement rows in file order.
fn write_trial_output(
    output_path: &Path,
    trial: &Trial,
    output_header: &[String],
    output_units: &HashMap<String, String>,
) -> Result<()> {
    let file_name = trial.file_name();

    let mut writer = csv::Writer::from_path(output_path).map_err(|e| {
        Error::trial_format(
            &file_name,
            format!(
                "Failed to create output file '{}': {}",
                output_path.display(),
                e
            ),
        )
    })?;

    writer.write_record(output_header)?;

    let units_row: Vec<&str> = output_header
        .iter()
        .map(|symbol| output_units.get(symbol).map(String::as_str).unwrap_or(""))
        .collect();
    writer.write_record(&units_row)?;

    for measurement in &trial.records {
        let mut row = Vec::with_capacity(output_header.len());
        for symbol in output_header {
            let value = measurement.get(symbol).ok_or_else(|| {
                Error::trial_format(
                    &file_name,
                    format!("Missing value for output column '{}'", symbol),
                )
            })?;
            row.push(value.to_string());
        }
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush '{}'", output_path.display()), e))?;
    Ok(())
}

/// Write the cross-trial summary record as pretty-printed JSON
fn write_summary(summary_path: &Path, summary: &Summary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary)?;
    std::fs::write(summary_path, content).map_err(|e| {
        Error::io(
            format!("Failed to write summary '{}'", summary_path.display()),
            e,
        )
    })
}

/// Create a progress bar with appropriate styling
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_filters_by_prefix_and_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("input_preliminary_2.csv"), "x").unwrap();
        fs::write(dir.path().join("input_preliminary_1.csv"), "x").unwrap();
        fs::write(dir.path().join("input_preliminary_3.txt"), "x").unwrap();
        fs::write(dir.path().join("other_1.csv"), "x").unwrap();
        fs::create_dir(dir.path().join("input_preliminary_dir.csv")).unwrap();

        let files = discover_trial_files(dir.path(), "input_preliminary", "csv").unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["input_preliminary_1.csv", "input_preliminary_2.csv"]
        );
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = discover_trial_files(dir.path(), "input_preliminary", "csv").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_trial_files(&missing, "input_preliminary", "csv").is_err());
    }

    #[test]
    fn test_derive_rejects_preexisting_derived_column() {
        let mut measurement = Measurement::new();
        measurement.insert(SYMBOL_TEMPERATURE.to_string(), Value::Float(20.0));
        measurement.insert(SYMBOL_PRESSURE.to_string(), Value::Float(101.33));
        measurement.insert(SYMBOL_CHARGE.to_string(), Value::Float(25.65));
        measurement.insert(SYMBOL_K_TP.to_string(), Value::Float(1.0));

        let result = derive_corrected_quantities(measurement, 1.2, "trial.csv");
        assert!(matches!(result, Err(Error::TrialFormat { .. })));
    }

    #[test]
    fn test_derive_extends_with_both_quantities() {
        let mut measurement = Measurement::new();
        measurement.insert(SYMBOL_TEMPERATURE.to_string(), Value::Float(20.0));
        measurement.insert(SYMBOL_PRESSURE.to_string(), Value::Float(101.33));
        measurement.insert(SYMBOL_CHARGE.to_string(), Value::Float(25.65));

        let derived = derive_corrected_quantities(measurement, 1.2, "trial.csv").unwrap();

        let k_tp = derived[SYMBOL_K_TP].as_f64();
        let corrected = derived[SYMBOL_CORRECTED_CHARGE].as_f64();
        assert!((k_tp - 1.0).abs() < 1e-12);
        assert!((corrected - 25.65).abs() < 1e-12);
    }

    #[test]
    fn test_derive_missing_required_quantity() {
        let mut measurement = Measurement::new();
        measurement.insert(SYMBOL_TEMPERATURE.to_string(), Value::Float(20.0));
        measurement.insert(SYMBOL_CHARGE.to_string(), Value::Float(25.65));

        let result = derive_corrected_quantities(measurement, 1.2, "trial.csv");
        assert!(matches!(
            result,
            Err(Error::TrialFormat { ref message, .. }) if message.contains("'P'")
        ));
    }
}
