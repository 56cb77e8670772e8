// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Voltage drop calculations for conductor runs, using the K-factor method:
//!
//! ```text
//! Vdrop = K × I × L / CM
//! ```
//!
//! where `K` depends on the conductor material, `I` is the load current in
//! amps, `L` is the one-way length in feet and `CM` is the cross-section of
//! the conductor in circular mils.

use crate::conductor::{circular_mils, ConductorMaterial};
use crate::utilization::round_to;
use crate::Error;

/// Returns the voltage drop, in percent of `voltage`, over a copper conductor
/// run, rounded to two decimal places.
///
/// Unknown conductor sizes are treated as `#1/0`.  Returns an error if
/// `voltage` is not positive, or if the length or current are negative or not
/// finite.
pub fn voltage_drop_percent(
    conductor_size: &str,
    length_feet: f64,
    load_amps: f64,
    voltage: f64,
) -> Result<f64, Error> {
    voltage_drop_percent_for(
        ConductorMaterial::Copper,
        conductor_size,
        length_feet,
        load_amps,
        voltage,
    )
}

/// Same as [`voltage_drop_percent`], for a conductor of the given material.
pub fn voltage_drop_percent_for(
    material: ConductorMaterial,
    conductor_size: &str,
    length_feet: f64,
    load_amps: f64,
    voltage: f64,
) -> Result<f64, Error> {
    if !voltage.is_finite() || voltage <= 0.0 {
        return Err(Error::invalid_input(format!(
            "Voltage must be positive, got {voltage}."
        )));
    }
    if !length_feet.is_finite() || length_feet < 0.0 {
        return Err(Error::invalid_input(format!(
            "Conductor length can't be negative, got {length_feet}."
        )));
    }
    if !load_amps.is_finite() || load_amps < 0.0 {
        return Err(Error::invalid_input(format!(
            "Load current can't be negative, got {load_amps}."
        )));
    }

    let cmil = f64::from(circular_mils(conductor_size));
    let drop_volts = material.k_factor() * load_amps * length_feet / cmil;

    Ok(round_to(drop_volts / voltage * 100.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_drop() -> Result<(), Error> {
        // (12.9 × 40 × 100) / 26240 = 1.967V, of 240V.
        assert_eq!(voltage_drop_percent("#6", 100.0, 40.0, 240.0)?, 0.82);
        assert_eq!(voltage_drop_percent("#2/0", 250.0, 150.0, 240.0)?, 1.51);
        assert_eq!(voltage_drop_percent("#12", 75.0, 16.0, 120.0)?, 1.98);
        Ok(())
    }

    #[test]
    fn test_aluminum_drop() -> Result<(), Error> {
        let copper = voltage_drop_percent_for(ConductorMaterial::Copper, "#4", 200.0, 60.0, 240.0)?;
        let aluminum =
            voltage_drop_percent_for(ConductorMaterial::Aluminum, "#4", 200.0, 60.0, 240.0)?;
        assert_eq!(copper, 1.55);
        assert_eq!(aluminum, 2.54);
        Ok(())
    }

    #[test]
    fn test_zero_length_or_load() -> Result<(), Error> {
        assert_eq!(voltage_drop_percent("#6", 0.0, 40.0, 240.0)?, 0.0);
        assert_eq!(voltage_drop_percent("#6", 100.0, 0.0, 240.0)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_unknown_size_uses_default() -> Result<(), Error> {
        assert_eq!(
            voltage_drop_percent("#weird", 100.0, 40.0, 240.0)?,
            voltage_drop_percent("#1/0", 100.0, 40.0, 240.0)?
        );
        Ok(())
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(voltage_drop_percent("#6", 100.0, 40.0, 0.0)
            .is_err_and(|e| e == Error::invalid_input("Voltage must be positive, got 0.")));
        assert!(voltage_drop_percent("#6", 100.0, 40.0, -240.0).is_err());
        assert!(voltage_drop_percent("#6", -1.0, 40.0, 240.0).is_err_and(
            |e| e == Error::invalid_input("Conductor length can't be negative, got -1.")
        ));
        assert!(voltage_drop_percent("#6", 100.0, -5.0, 240.0).is_err());
        assert!(voltage_drop_percent("#6", 100.0, f64::NAN, 240.0).is_err());
    }
}
