//! Pressure to seawater depth.
//!
//! UNESCO 1983 (Fofonoff & Millard) depth polynomial with a
//! latitude-dependent gravity term. Input pressure is in millibar;
//! 1 dbar = 100 mbar.

use crate::error::{OwhlError, Result};

/// Standard sea-level atmosphere, in millibar.
pub const STANDARD_ATMOSPHERE_MBAR: f64 = 1013.25;

/// Depth in meters for a single pressure in decibar.
pub fn dbar_to_depth(pressure_dbar: f64, latitude: f64) -> f64 {
    let p = pressure_dbar;
    let x = latitude.to_radians().sin().powi(2);
    let gravity = 9.780318 * (1.0 + (5.2788e-3 + 2.36e-5 * x) * x) + 1.092e-6 * p;
    ((((-1.82e-15 * p + 2.279e-10) * p - 2.2512e-5) * p + 9.72659) * p) / gravity
}

/// Converts a millibar series to seawater depth in meters.
pub fn mbar_to_depth(pressure_mbar: &[f64], latitude: Option<f64>) -> Result<Vec<f64>> {
    let latitude = latitude.ok_or(OwhlError::MissingLatitude)?;
    Ok(pressure_mbar
        .iter()
        .map(|&mbar| dbar_to_depth(mbar / 100.0, latitude))
        .collect())
}

/// Subtracts atmospheric pressure, then converts to depth.
pub fn sea_pressure_to_depth(
    pressure_mbar: &[f64],
    atmospheric_mbar: f64,
    latitude: Option<f64>,
) -> Result<Vec<f64>> {
    let sea_pressure: Vec<f64> = pressure_mbar.iter().map(|p| p - atmospheric_mbar).collect();
    mbar_to_depth(&sea_pressure, latitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value() {
        let depth = mbar_to_depth(&[2039.604], Some(33.72)).unwrap();
        assert!((depth[0] - 20.25).abs() < 0.005, "got {}", depth[0]);
    }

    #[test]
    fn test_missing_latitude_is_an_error() {
        let result = mbar_to_depth(&[2039.604], None);
        assert!(matches!(result, Err(OwhlError::MissingLatitude)));
    }

    #[test]
    fn test_zero_pressure_is_zero_depth() {
        assert_eq!(dbar_to_depth(0.0, 45.0), 0.0);
    }

    #[test]
    fn test_depth_grows_with_pressure_and_shrinks_toward_poles() {
        let shallow = dbar_to_depth(10.0, 30.0);
        let deep = dbar_to_depth(20.0, 30.0);
        assert!(deep > shallow);
        assert!(dbar_to_depth(20.0, 80.0) < dbar_to_depth(20.0, 0.0));
    }

    #[test]
    fn test_sea_pressure_subtracts_atmosphere() {
        let depth = sea_pressure_to_depth(&[STANDARD_ATMOSPHERE_MBAR], STANDARD_ATMOSPHERE_MBAR, Some(33.72)).unwrap();
        assert!(depth[0].abs() < 1e-12);
    }
}
