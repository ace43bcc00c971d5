//! TRS-398 dosimetry formulas.
//!
//! Implements the two operations the aggregation pipeline needs from the
//! calibration protocol: the temperature-pressure correction factor for an
//! open ionization chamber, and the fully corrected charge reading.
//! Reference conditions are 20 °C and 101.33 kPa.

use crate::{Error, Result};

/// Reference temperature in degrees Celsius
pub const REFERENCE_TEMPERATURE: f64 = 20.0;

/// Reference pressure in kilopascal
pub const REFERENCE_PRESSURE: f64 = 101.33;

/// Temperature-pressure correction factor `k_TP` for an open chamber.
///
/// `temperature` in °C, `pressure` in kPa. The factor is checked against
/// `max_correction`, an explicit ceiling from configuration; factors above
/// the ceiling (or non-finite, e.g. from a zero pressure reading) indicate
/// an implausible ambient reading and are rejected.
pub fn temperature_pressure_correction(
    temperature: f64,
    pressure: f64,
    max_correction: f64,
) -> Result<f64> {
    let k_tp = ((273.2 + temperature) / (273.2 + REFERENCE_TEMPERATURE))
        * (REFERENCE_PRESSURE / pressure);

    if !k_tp.is_finite() || k_tp > max_correction {
        return Err(Error::correction_out_of_bounds(k_tp, max_correction));
    }
    Ok(k_tp)
}

/// Fully corrected charge reading.
///
/// Applies the temperature-pressure, electrometer, polarity, and ion
/// recombination corrections to a reference charge reading.
pub fn corrected_charge(
    reference_charge: f64,
    k_tp: f64,
    k_elec: f64,
    k_pol: f64,
    k_s: f64,
) -> f64 {
    reference_charge * k_tp * k_elec * k_pol * k_s
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_k_tp_is_unity_at_reference_conditions() {
        let k_tp =
            temperature_pressure_correction(REFERENCE_TEMPERATURE, REFERENCE_PRESSURE, 1.2)
                .unwrap();
        assert!((k_tp - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_k_tp_increases_with_temperature() {
        let k_tp = temperature_pressure_correction(25.0, REFERENCE_PRESSURE, 1.2).unwrap();
        assert!(k_tp > 1.0);
        assert!((k_tp - (273.2 + 25.0) / (273.2 + 20.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_k_tp_increases_as_pressure_drops() {
        let k_tp = temperature_pressure_correction(20.0, 95.0, 1.2).unwrap();
        assert!((k_tp - 101.33 / 95.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_k_tp_ceiling_is_enforced() {
        // 50 °C at 80 kPa gives a factor near 1.4, above the 1.2 ceiling
        let result = temperature_pressure_correction(50.0, 80.0, 1.2);
        assert!(matches!(
            result,
            Err(Error::CorrectionOutOfBounds { max, .. }) if max == 1.2
        ));
    }

    #[test]
    fn test_k_tp_rejects_non_finite_factor() {
        let result = temperature_pressure_correction(20.0, 0.0, 1.2);
        assert!(result.is_err());
    }

    #[test]
    fn test_corrected_charge_with_unit_corrections() {
        assert_eq!(corrected_charge(25.65, 1.0, 1.0, 1.0, 1.0), 25.65);
    }

    #[test]
    fn test_corrected_charge_applies_all_factors() {
        let value = corrected_charge(20.0, 1.05, 1.002, 0.998, 1.001);
        assert!((value - 20.0 * 1.05 * 1.002 * 0.998 * 1.001).abs() < TOLERANCE);
    }
}
