//! TRS-398 Processor Library
//!
//! A Rust library for normalizing repeated ionization-chamber measurement
//! trials recorded as CSV files and reducing them to quality-control
//! statistics for radiotherapy calibration workflows.
//!
//! This library provides tools for:
//! - Parsing trial files with proper header/units/data section handling
//! - Schema-driven decoding of raw text records into typed measurements
//! - Table-driven unit conversion into the schema's canonical unit system
//! - Deriving the temperature-pressure correction factor and corrected charge
//! - Two-level statistical reduction (within-trial, then across-trial)
//! - Comprehensive error handling with file/row/field context

pub mod config;
pub mod constants;
pub mod models;

// Core pipeline services
pub mod services {
    pub mod aggregator;
    pub mod dosimetry;
    pub mod stats;
    pub mod trial_reader;
    pub mod unit_converter;
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::Config;
pub use models::{Measurement, Summary, Trial, TrialStatistics};

/// Result type alias for the TRS-398 processor
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for trial processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A data cell could not be coerced to its declared base type
    #[error("Decode error in file '{file}', row {row}, field '{field}': {message}")]
    Decode {
        file: String,
        row: usize,
        field: String,
        message: String,
    },

    /// Trial file structure error (missing units row, ragged records)
    #[error("Trial format error in file '{file}': {message}")]
    TrialFormat { file: String, message: String },

    /// A unit conversion was requested but no rule covers the unit pair
    #[error("No conversion rule for quantity '{quantity}': '{from}' -> '{to}'")]
    UnsupportedConversion {
        quantity: String,
        from: String,
        to: String,
    },

    /// A statistics reduction was applied to an empty sequence
    #[error("Cannot compute {operation} of an empty sequence")]
    EmptyReduction { operation: String },

    /// Temperature-pressure correction factor exceeded the configured ceiling
    #[error("Temperature-pressure correction factor {value} exceeds maximum {max}")]
    CorrectionOutOfBounds { value: f64, max: f64 },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error with file/row/field context
    pub fn decode(
        file: impl Into<String>,
        row: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Decode {
            file: file.into(),
            row,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a trial format error
    pub fn trial_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TrialFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported conversion error
    pub fn unsupported_conversion(
        quantity: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::UnsupportedConversion {
            quantity: quantity.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an empty reduction error
    pub fn empty_reduction(operation: impl Into<String>) -> Self {
        Self::EmptyReduction {
            operation: operation.into(),
        }
    }

    /// Create a correction bound error
    pub fn correction_out_of_bounds(value: f64, max: f64) -> Self {
        Self::CorrectionOutOfBounds { value, max }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::TrialFormat {
            file: "unknown".to_string(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("JSON document error: {}", error),
        }
    }
}
