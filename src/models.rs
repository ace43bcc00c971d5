//! Core data structures for trial processing.
//!
//! Defines the typed measurement values produced by decoding, the
//! per-trial containers, and the statistical result types emitted by
//! the aggregation pipeline.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single typed measurement value, coerced per its declared base type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Integer quantity (e.g. the reading index)
    Int(i64),
    /// Floating-point quantity (temperature, pressure, charge, factors)
    Float(f64),
}

impl Value {
    /// Numeric view of the value, widening integers to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
        }
    }

    /// True for `Value::Float`
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A typed measurement record: quantity symbol -> numeric value.
///
/// Created by the row decoder from one data row; the derivation step
/// extends it with `k_TP` and `m_corrected` after unit conversion.
pub type Measurement = HashMap<String, Value>;

/// One independently recorded measurement session, read from one input file
#[derive(Debug, Clone)]
pub struct Trial {
    /// Source file the trial was read from
    pub path: PathBuf,
    /// Units declared in the file's units row, per column
    pub units: HashMap<String, String>,
    /// Decoded measurement records, in file order
    pub records: Vec<Measurement>,
}

impl Trial {
    /// File name of the source trial file
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Number of decoded measurement records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Within-trial statistics over the corrected-charge sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialStatistics {
    /// Arithmetic mean of the corrected charges
    pub average: f64,
    /// Population standard deviation of the corrected charges
    pub std_dev: f64,
    /// Empirical expected value of the corrected charges
    pub expected_value: f64,
}

/// Cross-trial statistics computed over the per-trial averages.
///
/// Serialized field names match the summary record layout consumed by
/// downstream calibration reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "m_corrected_average")]
    pub average: f64,
    #[serde(rename = "m_corrected_stdDev")]
    pub std_dev: f64,
    #[serde(rename = "m_corrected_expectedValue")]
    pub expected_value: f64,
}

/// Build the output path for one trial: output prefix prepended to the
/// original file name, placed in the output directory.
pub fn output_path_for(trial_path: &Path, output_dir: &Path, output_prefix: &str) -> PathBuf {
    let stem = trial_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = trial_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    output_dir.join(format!("{}{}{}", output_prefix, stem, extension))
}
