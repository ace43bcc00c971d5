//! Configuration management and validation.
//!
//! The processor is driven by a JSON configuration document carrying the
//! quantity schema (symbol, unit, base type per quantity), the file naming
//! conventions for trial input/output, and the correction-factor limit.
//! Sections of the document not consumed by the pipeline are ignored.

use crate::constants::{
    DEFAULT_CONFIG_FILENAME, DEFAULT_FILETYPE, DEFAULT_INPUT_PREFIX, DEFAULT_MAX_K_TP,
    DEFAULT_OUTPUT_PREFIX, SYMBOL_CHARGE, SYMBOL_CORRECTED_CHARGE, SYMBOL_INDEX, SYMBOL_K_TP,
    SYMBOL_PRESSURE, SYMBOL_TEMPERATURE, UNIT_CELSIUS, UNIT_DIMENSIONLESS, UNIT_KILOPASCAL,
    UNIT_NANOCOULOMB,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Declared base type of a quantity.
///
/// Resolved at load time; a quantity with a missing or unrecognized
/// `baseType` fails deserialization, which is the configuration error
/// the pipeline requires before any measurement processing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// Integer-valued quantity
    Int,
    /// Floating-point quantity
    Float,
}

/// Static descriptor of one physical quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityConfig {
    /// Column symbol, unique key into the schema
    pub symbol: String,
    /// Canonical unit the pipeline converts this quantity into
    pub unit: String,
    /// Human-readable quantity name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Declared base type used by the row decoder
    #[serde(rename = "baseType")]
    pub base_type: BaseType,
}

/// Naming convention for one class of files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNaming {
    /// Filename prefix
    pub prefix: String,
    /// File extension without the leading dot
    pub extension: String,
    /// Ordered column header, where applicable
    #[serde(default)]
    pub header: Vec<String>,
}

impl FileNaming {
    /// Full filename for prefix-plus-extension naming (summary artifact)
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.prefix, self.extension)
    }
}

/// File naming section of the configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Input trial files (prefix filter + expected header)
    pub input: FileNaming,
    /// Per-trial output files (header extended with derived columns)
    pub output: FileNaming,
    /// JSON summary artifact
    pub summary: FileNaming,
}

/// Bound on a derived correction factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrectionLimit {
    /// Maximum allowed value
    pub max: f64,
}

/// Limits section of the configuration document
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Ceiling for the temperature-pressure correction factor
    pub k_tp: CorrectionLimit,
}

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Quantity schema: symbol -> descriptor
    pub quantities: HashMap<String, QuantityConfig>,
    /// File naming conventions
    pub files: FilesConfig,
    /// Derived-quantity limits
    pub limits: LimitsConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut quantities = HashMap::new();
        quantities.insert(
            SYMBOL_INDEX.to_string(),
            QuantityConfig {
                symbol: SYMBOL_INDEX.to_string(),
                unit: UNIT_DIMENSIONLESS.to_string(),
                name: "index".to_string(),
                description: "Index of the measurement".to_string(),
                base_type: BaseType::Int,
            },
        );
        quantities.insert(
            SYMBOL_TEMPERATURE.to_string(),
            QuantityConfig {
                symbol: SYMBOL_TEMPERATURE.to_string(),
                unit: UNIT_CELSIUS.to_string(),
                name: "temperature".to_string(),
                description: "Temperature of the ionization chamber".to_string(),
                base_type: BaseType::Float,
            },
        );
        quantities.insert(
            SYMBOL_PRESSURE.to_string(),
            QuantityConfig {
                symbol: SYMBOL_PRESSURE.to_string(),
                unit: UNIT_KILOPASCAL.to_string(),
                name: "pressure".to_string(),
                description: "Pressure of the ionization chamber".to_string(),
                base_type: BaseType::Float,
            },
        );
        quantities.insert(
            SYMBOL_CHARGE.to_string(),
            QuantityConfig {
                symbol: SYMBOL_CHARGE.to_string(),
                unit: UNIT_NANOCOULOMB.to_string(),
                name: "charge".to_string(),
                description: "Charge measured by the ionization chamber".to_string(),
                base_type: BaseType::Float,
            },
        );
        quantities.insert(
            SYMBOL_K_TP.to_string(),
            QuantityConfig {
                symbol: SYMBOL_K_TP.to_string(),
                unit: UNIT_DIMENSIONLESS.to_string(),
                name: "temperature-pressure correction factor".to_string(),
                description: "Temperature-pressure correction factor".to_string(),
                base_type: BaseType::Float,
            },
        );
        quantities.insert(
            SYMBOL_CORRECTED_CHARGE.to_string(),
            QuantityConfig {
                symbol: SYMBOL_CORRECTED_CHARGE.to_string(),
                unit: UNIT_NANOCOULOMB.to_string(),
                name: "corrected charge".to_string(),
                description: "Corrected charge measured by the ionization chamber".to_string(),
                base_type: BaseType::Float,
            },
        );

        Self {
            quantities,
            files: FilesConfig {
                input: FileNaming {
                    prefix: DEFAULT_INPUT_PREFIX.to_string(),
                    extension: DEFAULT_FILETYPE.to_string(),
                    header: vec![
                        SYMBOL_INDEX.to_string(),
                        SYMBOL_TEMPERATURE.to_string(),
                        SYMBOL_PRESSURE.to_string(),
                        SYMBOL_CHARGE.to_string(),
                    ],
                },
                output: FileNaming {
                    prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
                    extension: DEFAULT_FILETYPE.to_string(),
                    header: vec![
                        SYMBOL_INDEX.to_string(),
                        SYMBOL_TEMPERATURE.to_string(),
                        SYMBOL_PRESSURE.to_string(),
                        SYMBOL_CHARGE.to_string(),
                        SYMBOL_K_TP.to_string(),
                        SYMBOL_CORRECTED_CHARGE.to_string(),
                    ],
                },
                summary: FileNaming {
                    prefix: "summary".to_string(),
                    extension: "json".to_string(),
                    header: Vec::new(),
                },
            },
            limits: LimitsConfig {
                k_tp: CorrectionLimit {
                    max: DEFAULT_MAX_K_TP,
                },
            },
        }
    }
}

impl Config {
    /// Load and validate a configuration document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file '{}'", path.display()),
                e,
            )
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Malformed config document '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        debug!(
            "Loaded configuration from '{}' with {} quantities",
            path.display(),
            config.quantities.len()
        );
        Ok(config)
    }

    /// Write the configuration document to disk as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| {
            Error::io(
                format!("Failed to write config file '{}'", path.display()),
                e,
            )
        })
    }

    /// Default configuration file location under the user config directory
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("trs398-processor").join(DEFAULT_CONFIG_FILENAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Validate internal consistency of the document
    pub fn validate(&self) -> Result<()> {
        if self.files.input.header.is_empty() {
            return Err(Error::configuration("Input file header must not be empty"));
        }

        for symbol in self
            .files
            .input
            .header
            .iter()
            .chain(self.files.output.header.iter())
        {
            if !self.quantities.contains_key(symbol) {
                return Err(Error::configuration(format!(
                    "Header column '{}' has no quantity descriptor",
                    symbol
                )));
            }
        }

        for (key, quantity) in &self.quantities {
            if key != &quantity.symbol {
                return Err(Error::configuration(format!(
                    "Quantity key '{}' does not match its symbol '{}'",
                    key, quantity.symbol
                )));
            }
        }

        if !self.limits.k_tp.max.is_finite() || self.limits.k_tp.max <= 0.0 {
            return Err(Error::configuration(format!(
                "k_TP limit must be a positive finite number, got {}",
                self.limits.k_tp.max
            )));
        }

        Ok(())
    }

    /// Base-type mapping consumed by the row decoder: symbol -> base type
    pub fn base_types(&self) -> HashMap<String, BaseType> {
        self.quantities
            .iter()
            .map(|(symbol, quantity)| (symbol.clone(), quantity.base_type))
            .collect()
    }

    /// Canonical unit mapping for the given header columns: symbol -> unit
    pub fn canonical_units(&self, header: &[String]) -> Result<HashMap<String, String>> {
        header
            .iter()
            .map(|symbol| {
                self.quantities
                    .get(symbol)
                    .map(|quantity| (symbol.clone(), quantity.unit.clone()))
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "Header column '{}' has no quantity descriptor",
                            symbol
                        ))
                    })
            })
            .collect()
    }

    /// Configured ceiling for the temperature-pressure correction factor
    pub fn max_k_tp(&self) -> f64 {
        self.limits.k_tp.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quantities.len(), 6);
        assert_eq!(config.files.input.header.len(), 4);
        assert_eq!(config.files.output.header.len(), 6);
        assert_eq!(config.max_k_tp(), DEFAULT_MAX_K_TP);
    }

    #[test]
    fn test_base_types_mapping() {
        let config = Config::default();
        let base_types = config.base_types();
        assert_eq!(base_types[SYMBOL_INDEX], BaseType::Int);
        assert_eq!(base_types[SYMBOL_TEMPERATURE], BaseType::Float);
        assert_eq!(base_types[SYMBOL_CORRECTED_CHARGE], BaseType::Float);
    }

    #[test]
    fn test_canonical_units_for_header() {
        let config = Config::default();
        let units = config
            .canonical_units(&config.files.output.header)
            .unwrap();
        assert_eq!(units[SYMBOL_TEMPERATURE], UNIT_CELSIUS);
        assert_eq!(units[SYMBOL_PRESSURE], UNIT_KILOPASCAL);
        assert_eq!(units[SYMBOL_K_TP], UNIT_DIMENSIONLESS);
    }

    #[test]
    fn test_canonical_units_unknown_symbol() {
        let config = Config::default();
        let result = config.canonical_units(&["notes".to_string()]);
        assert!(matches!(result, Err(crate::Error::Configuration { .. })));
    }

    #[test]
    fn test_missing_base_type_fails_deserialization() {
        let document = r#"{
            "quantities": {
                "T": {"symbol": "T", "unit": "°C", "name": "temperature"}
            },
            "files": {
                "input": {"prefix": "in", "extension": "csv", "header": ["T"]},
                "output": {"prefix": "out", "extension": "csv", "header": ["T"]},
                "summary": {"prefix": "summary", "extension": "json"}
            },
            "limits": {"k_tp": {"max": 1.2}}
        }"#;
        let result: std::result::Result<Config, _> = serde_json::from_str(document);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let mut document = serde_json::to_value(Config::default()).unwrap();
        document["devices"] = serde_json::json!({"iViewGT": {"type": "epid"}});
        let config: Config = serde_json::from_value(document).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_header_column() {
        let mut config = Config::default();
        config.files.input.header.push("mystery".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_limit() {
        let mut config = Config::default();
        config.limits.k_tp.max = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);

        let config = Config::default();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.quantities.len(), config.quantities.len());
        assert_eq!(loaded.files.input.prefix, config.files.input.prefix);
        assert_eq!(loaded.max_k_tp(), config.max_k_tp());
    }
}
