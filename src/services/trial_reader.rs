//! Trial file reading and row decoding.
//!
//! A trial file is plain delimited text: line 1 carries the column header
//! names, line 2 the unit string per column, and every following line one
//! data row. Reading produces a [`Trial`] of typed measurements in file
//! order together with the file's declared units.
//!
//! Decoding is schema-driven: each cell is coerced per its quantity's
//! declared base type. Columns without a quantity descriptor (e.g.
//! free-text notes) are silently dropped; a cell that fails coercion
//! aborts the trial with file, row, and field identity.

use crate::config::BaseType;
use crate::models::{Measurement, Trial, Value};
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Decode one raw data row into a typed measurement.
///
/// `row` is the 1-based index of the data row within the file's data
/// section, used for error reporting only.
pub fn decode_row(
    record: &StringRecord,
    header: &StringRecord,
    base_types: &HashMap<String, BaseType>,
    file: &str,
    row: usize,
) -> Result<Measurement> {
    let mut measurement = Measurement::new();

    for (field, raw) in header.iter().zip(record.iter()) {
        let Some(base_type) = base_types.get(field) else {
            // Non-schema column, e.g. a notes field
            continue;
        };

        let raw = raw.trim();
        let value = match base_type {
            BaseType::Int => raw.parse::<i64>().map(Value::Int).map_err(|e| {
                Error::decode(file, row, field, format!("invalid integer '{}' ({})", raw, e))
            })?,
            BaseType::Float => raw.parse::<f64>().map(Value::Float).map_err(|e| {
                Error::decode(file, row, field, format!("invalid float '{}' ({})", raw, e))
            })?,
        };
        measurement.insert(field.to_string(), value);
    }

    Ok(measurement)
}

/// Read one trial file into typed, file-ordered measurement records.
pub fn read_trial(path: &Path, base_types: &HashMap<String, BaseType>) -> Result<Trial> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::trial_format(&file_name, format!("Failed to open file: {}", e)))?;

    let header = reader
        .headers()
        .map_err(|e| Error::trial_format(&file_name, format!("Failed to read header: {}", e)))?
        .clone();

    let mut records = reader.records();

    // The units row is mandatory and sits immediately after the header
    let units_record = records
        .next()
        .ok_or_else(|| Error::trial_format(&file_name, "Missing units row after header"))?
        .map_err(|e| Error::trial_format(&file_name, format!("Malformed units row: {}", e)))?;

    let units: HashMap<String, String> = header
        .iter()
        .zip(units_record.iter())
        .map(|(field, unit)| (field.to_string(), unit.trim().to_string()))
        .collect();

    let mut measurements = Vec::new();
    for (index, result) in records.enumerate() {
        let row = index + 1;
        let record = result
            .map_err(|e| Error::trial_format(&file_name, format!("Data row {}: {}", row, e)))?;
        measurements.push(decode_row(&record, &header, base_types, &file_name, row)?);
    }

    debug!(
        "Read {} measurement records from '{}'",
        measurements.len(),
        file_name
    );

    Ok(Trial {
        path: path.to_path_buf(),
        units,
        records: measurements,
    })
}
