//! Reflector aperture sizing from a half-power beamwidth
//!
//! D = 1.06505·λ / θ₃dB, A = πD²/4, D₀ = η·4πA/λ²

use crate::{require_positive, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Free-space propagation speed used for wavelength conversion (m/s)
pub const SPEED_OF_LIGHT_M_S: f64 = 3.0e8;

/// Aperture efficiency assumed when none is supplied
pub const DEFAULT_APERTURE_EFFICIENCY: f64 = 0.4364;

/// Beamwidth-to-diameter factor for the assumed illumination taper
pub const BEAMWIDTH_FACTOR: f64 = 1.06505;

/// Derived reflector dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApertureSizing {
    pub wavelength_m: f64,
    pub diameter_m: f64,
    pub area_m2: f64,
    pub directivity_linear: f64,
    pub directivity_dbi: f64,
}

pub fn wavelength_m(frequency_hz: f64) -> f64 {
    SPEED_OF_LIGHT_M_S / frequency_hz
}

/// Size a reflector that produces `bw3db_deg` at `frequency_ghz`
pub fn size_from_beamwidth(
    frequency_ghz: f64,
    bw3db_deg: f64,
    efficiency: f64,
) -> Result<ApertureSizing> {
    require_positive("frequency_ghz", frequency_ghz)?;
    require_positive("bw3db_deg", bw3db_deg)?;
    require_positive("efficiency", efficiency)?;

    let wavelength_m = wavelength_m(frequency_ghz * 1e9);
    let diameter_m = BEAMWIDTH_FACTOR * wavelength_m / bw3db_deg.to_radians();
    let area_m2 = PI * diameter_m.powi(2) / 4.0;
    let directivity_linear = efficiency * 4.0 * PI * area_m2 / wavelength_m.powi(2);

    Ok(ApertureSizing {
        wavelength_m,
        diameter_m,
        area_m2,
        directivity_linear,
        directivity_dbi: 10.0 * directivity_linear.log10(),
    })
}

/// Peak directivity (dBi) of a reflector sized for `bw3db_deg`
pub fn directivity_from_beamwidth(frequency_ghz: f64, bw3db_deg: f64, efficiency: f64) -> Result<f64> {
    size_from_beamwidth(frequency_ghz, bw3db_deg, efficiency).map(|s| s.directivity_dbi)
}

/// Diameter (m) of a reflector with the given peak directivity and efficiency
pub fn diameter_from_directivity(frequency_hz: f64, directivity_dbi: f64, efficiency: f64) -> Result<f64> {
    require_positive("frequency_hz", frequency_hz)?;
    require_positive("efficiency", efficiency)?;

    let linear = 10f64.powf(directivity_dbi / 10.0);
    Ok(wavelength_m(frequency_hz) / PI * (linear / efficiency).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternError;

    #[test]
    fn test_ka_band_sizing() {
        // 20 GHz, 0.5° beam: λ = 15 mm, D ≈ 1.83 m
        let sizing = size_from_beamwidth(20.0, 0.5, DEFAULT_APERTURE_EFFICIENCY).unwrap();
        assert!((sizing.wavelength_m - 0.015).abs() < 1e-12);
        assert!((sizing.diameter_m - 1.8307).abs() < 1e-3, "D = {}", sizing.diameter_m);
        assert!((sizing.directivity_dbi - 48.07).abs() < 0.05, "D0 = {}", sizing.directivity_dbi);
    }

    #[test]
    fn test_narrower_beam_more_directive() {
        let wide = directivity_from_beamwidth(20.0, 1.0, 0.65).unwrap();
        let narrow = directivity_from_beamwidth(20.0, 0.5, 0.65).unwrap();
        // Halving the beamwidth doubles the diameter: +6 dB
        assert!((narrow - wide - 20.0 * 2f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_directivity_diameter_round_trip() {
        let sizing = size_from_beamwidth(18.0, 0.6, 0.55).unwrap();
        let d = diameter_from_directivity(18.0e9, sizing.directivity_dbi, 0.55).unwrap();
        assert!((d - sizing.diameter_m).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(matches!(
            size_from_beamwidth(0.0, 0.5, 0.6),
            Err(PatternError::InvalidParameter { name: "frequency_ghz", .. })
        ));
        assert!(matches!(
            size_from_beamwidth(20.0, -1.0, 0.6),
            Err(PatternError::InvalidParameter { name: "bw3db_deg", .. })
        ));
        assert!(matches!(
            directivity_from_beamwidth(20.0, 0.5, 0.0),
            Err(PatternError::InvalidParameter { name: "efficiency", .. })
        ));
    }
}
