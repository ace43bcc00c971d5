//! Statistical reducers for measurement sequences.
//!
//! Three pure functions over an ordered, non-empty sequence of readings.
//! They are applied twice per analysis run: within each trial over the
//! corrected-charge values, then across trials over the per-trial averages.

use crate::{Error, Result};

/// Arithmetic mean of a non-empty sequence
pub fn average(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::empty_reduction("average"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of a non-empty sequence.
///
/// Divisor is `n`: a trial's readings are treated as the entire
/// population of interest, not a sample of a larger one.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::empty_reduction("standard deviation"));
    }
    let mean = average(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Empirical expected value of a non-empty sequence.
///
/// Numerically identical to [`average`]; kept as a named operation
/// because calibration protocols report it as a distinct quantity.
pub fn expected_value(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::empty_reduction("expected value"));
    }
    average(values)
}
