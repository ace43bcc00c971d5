//! Table-driven unit conversion for typed measurements.
//!
//! Each quantity in a measurement is rewritten from its declared source
//! unit into the schema's canonical target unit. The rule table is closed:
//! a requested conversion with no matching rule is a configuration error,
//! never a silent pass-through. Identity conversions copy the value
//! unchanged.

use crate::models::{Measurement, Value};
use crate::{Error, Result};
use std::collections::HashMap;

/// kPa per mmHg at the TRS-398 reference pressure
const KPA_PER_MMHG: f64 = 101.33 / 760.0;

/// Offset added to a Kelvin reading to obtain degrees Celsius
const CELSIUS_FROM_KELVIN_OFFSET: f64 = -273.15;

/// A supported unit conversion rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    FahrenheitToCelsius,
    KelvinToCelsius,
    MillibarToKilopascal,
    MmHgToKilopascal,
}

impl Conversion {
    /// Look up the rule for a source/target unit pair
    fn for_units(from: &str, to: &str) -> Option<Self> {
        match (from, to) {
            ("°F", "°C") => Some(Self::FahrenheitToCelsius),
            ("K", "°C") => Some(Self::KelvinToCelsius),
            ("mbar", "kPa") => Some(Self::MillibarToKilopascal),
            ("mmHg", "kPa") => Some(Self::MmHgToKilopascal),
            _ => None,
        }
    }

    /// Apply the rule to a floating-point reading
    fn apply(&self, value: f64) -> f64 {
        match self {
            Self::FahrenheitToCelsius => (value - 32.0) * 5.0 / 9.0,
            Self::KelvinToCelsius => value + CELSIUS_FROM_KELVIN_OFFSET,
            Self::MillibarToKilopascal => value / 10.0,
            Self::MmHgToKilopascal => value * KPA_PER_MMHG,
        }
    }
}

/// Convert a typed measurement from its declared source units into the
/// target units, quantity by quantity.
///
/// Quantities whose source and target units match are copied unchanged.
/// A differing unit pair with no rule, a conversion requested for an
/// integer quantity, or a quantity missing from either unit mapping is
/// rejected.
pub fn convert_measurement(
    measurement: &Measurement,
    source_units: &HashMap<String, String>,
    target_units: &HashMap<String, String>,
) -> Result<Measurement> {
    let mut converted = Measurement::with_capacity(measurement.len());

    for (symbol, value) in measurement {
        let from = source_units.get(symbol).ok_or_else(|| {
            Error::configuration(format!(
                "No source unit declared for quantity '{}'",
                symbol
            ))
        })?;
        let to = target_units.get(symbol).ok_or_else(|| {
            Error::configuration(format!(
                "No target unit declared for quantity '{}'",
                symbol
            ))
        })?;

        if from == to {
            converted.insert(symbol.clone(), *value);
            continue;
        }

        let rule = Conversion::for_units(from, to)
            .ok_or_else(|| Error::unsupported_conversion(symbol, from, to))?;

        match value {
            Value::Float(v) => {
                converted.insert(symbol.clone(), Value::Float(rule.apply(*v)));
            }
            Value::Int(_) => {
                return Err(Error::unsupported_conversion(symbol, from, to));
            }
        }
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn units(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn float_of(measurement: &Measurement, symbol: &str) -> f64 {
        measurement[symbol].as_f64()
    }

    #[test]
    fn test_identity_conversion_is_a_no_op() {
        let mut measurement = Measurement::new();
        measurement.insert("T".to_string(), Value::Float(22.1));
        measurement.insert("index".to_string(), Value::Int(1));

        let declared = units(&[("T", "°C"), ("index", "unit")]);
        let converted = convert_measurement(&measurement, &declared, &declared).unwrap();

        assert_eq!(converted, measurement);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        let mut measurement = Measurement::new();
        measurement.insert("T".to_string(), Value::Float(212.0));

        let converted = convert_measurement(
            &measurement,
            &units(&[("T", "°F")]),
            &units(&[("T", "°C")]),
        )
        .unwrap();

        assert!((float_of(&converted, "T") - 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_kelvin_to_celsius() {
        let mut measurement = Measurement::new();
        measurement.insert("T".to_string(), Value::Float(293.15));

        let converted = convert_measurement(
            &measurement,
            &units(&[("T", "K")]),
            &units(&[("T", "°C")]),
        )
        .unwrap();

        assert!((float_of(&converted, "T") - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_millibar_to_kilopascal() {
        let mut measurement = Measurement::new();
        measurement.insert("P".to_string(), Value::Float(1013.25));

        let converted = convert_measurement(
            &measurement,
            &units(&[("P", "mbar")]),
            &units(&[("P", "kPa")]),
        )
        .unwrap();

        assert!((float_of(&converted, "P") - 101.325).abs() < TOLERANCE);
    }

    #[test]
    fn test_mmhg_to_kilopascal() {
        let mut measurement = Measurement::new();
        measurement.insert("P".to_string(), Value::Float(760.0));

        let converted = convert_measurement(
            &measurement,
            &units(&[("P", "mmHg")]),
            &units(&[("P", "kPa")]),
        )
        .unwrap();

        assert!((float_of(&converted, "P") - 101.33).abs() < TOLERANCE);
    }

    #[test]
    fn test_unknown_unit_pair_is_rejected() {
        let mut measurement = Measurement::new();
        measurement.insert("m".to_string(), Value::Float(25.65));

        let result = convert_measurement(
            &measurement,
            &units(&[("m", "nC")]),
            &units(&[("m", "µC")]),
        );

        assert!(matches!(
            result,
            Err(Error::UnsupportedConversion { ref quantity, ref from, ref to })
                if quantity == "m" && from == "nC" && to == "µC"
        ));
    }

    #[test]
    fn test_integer_quantity_cannot_be_converted() {
        let mut measurement = Measurement::new();
        measurement.insert("T".to_string(), Value::Int(300));

        let result = convert_measurement(
            &measurement,
            &units(&[("T", "K")]),
            &units(&[("T", "°C")]),
        );

        assert!(matches!(result, Err(Error::UnsupportedConversion { .. })));
    }

    #[test]
    fn test_missing_unit_declaration_is_rejected() {
        let mut measurement = Measurement::new();
        measurement.insert("T".to_string(), Value::Float(22.1));

        let result = convert_measurement(&measurement, &units(&[]), &units(&[("T", "°C")]));
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
