//! Application constants for the TRS-398 processor
//!
//! This module contains default file naming, canonical units, and
//! limit values used throughout the application.

// =============================================================================
// File Naming Defaults
// =============================================================================

/// Default filename prefix for input trial files
pub const DEFAULT_INPUT_PREFIX: &str = "input_preliminary";

/// Default filename prefix prepended to each per-trial output file
pub const DEFAULT_OUTPUT_PREFIX: &str = "output_preliminary";

/// Default file type (extension, without dot) for trial files
pub const DEFAULT_FILETYPE: &str = "csv";

/// Default name of the configuration document
pub const DEFAULT_CONFIG_FILENAME: &str = "config.json";

// =============================================================================
// Canonical Units
// =============================================================================

/// Canonical temperature unit
pub const UNIT_CELSIUS: &str = "°C";

/// Canonical pressure unit
pub const UNIT_KILOPASCAL: &str = "kPa";

/// Canonical charge unit
pub const UNIT_NANOCOULOMB: &str = "nC";

/// Unit string for dimensionless quantities
pub const UNIT_DIMENSIONLESS: &str = "unit";

// =============================================================================
// Quantity Symbols
// =============================================================================

/// Reading index column
pub const SYMBOL_INDEX: &str = "index";

/// Chamber temperature column
pub const SYMBOL_TEMPERATURE: &str = "T";

/// Chamber pressure column
pub const SYMBOL_PRESSURE: &str = "P";

/// Raw charge reading column
pub const SYMBOL_CHARGE: &str = "m";

/// Derived temperature-pressure correction factor column
pub const SYMBOL_K_TP: &str = "k_TP";

/// Derived corrected charge column
pub const SYMBOL_CORRECTED_CHARGE: &str = "m_corrected";

// =============================================================================
// Limits
// =============================================================================

/// Default ceiling for the temperature-pressure correction factor
pub const DEFAULT_MAX_K_TP: f64 = 1.2;
