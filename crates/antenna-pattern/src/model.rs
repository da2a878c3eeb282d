//! Physical-optics reflector pattern
//!
//! Total power pattern = (TE11 feed pattern)² × circular-aperture diffraction
//! pattern, renormalized to a 0 dB peak and floored at −90 dB.

use crate::aperture::{diameter_from_directivity, wavelength_m, BEAMWIDTH_FACTOR};
use crate::bessel::{airy_power, j1_over_x};
use crate::pattern::AntennaPattern;
use crate::{require_positive, PatternError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// TE11 cutoff wavelength factor for a circular waveguide (λc = 1.706·a)
pub const TE11_CUTOFF_FACTOR: f64 = 1.706;

/// Lowest relative gain the model reports (dB)
pub const PATTERN_FLOOR_DB: f64 = -90.0;

const LINEAR_FLOOR: f64 = 1e-90;

/// How the reflector diameter is specified
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aperture {
    /// Physical diameter in metres
    Diameter { meters: f64 },
    /// Diameter implied by a peak directivity at the given efficiency
    Directivity { dbi: f64, efficiency: f64 },
    /// Diameter implied by a half-power beamwidth
    Beamwidth { bw3db_deg: f64 },
}

/// Reflector + feed description for the forward model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiationModel {
    pub frequency_hz: f64,
    pub aperture: Aperture,
    /// Focal length over diameter, carried with the geometry
    pub f_over_d: f64,
    /// Feed waveguide radius (m)
    pub waveguide_radius_m: f64,
    pub theta_min_deg: f64,
    pub theta_max_deg: f64,
    pub samples: usize,
}

impl Default for RadiationModel {
    fn default() -> Self {
        // Ka-band downlink reflector
        Self {
            frequency_hz: 18.0e9,
            aperture: Aperture::Diameter { meters: 2.0341 },
            f_over_d: 1.27,
            waveguide_radius_m: 0.002,
            theta_min_deg: 0.0,
            theta_max_deg: 12.0,
            samples: 1000,
        }
    }
}

impl RadiationModel {
    /// Reflector diameter in metres
    pub fn diameter_m(&self) -> Result<f64> {
        require_positive("frequency_hz", self.frequency_hz)?;
        let diameter = match self.aperture {
            Aperture::Diameter { meters } => meters,
            Aperture::Directivity { dbi, efficiency } => {
                diameter_from_directivity(self.frequency_hz, dbi, efficiency)?
            }
            Aperture::Beamwidth { bw3db_deg } => {
                require_positive("bw3db_deg", bw3db_deg)?;
                BEAMWIDTH_FACTOR * wavelength_m(self.frequency_hz) / bw3db_deg.to_radians()
            }
        };
        require_positive("diameter_m", diameter)?;
        Ok(diameter)
    }

    fn validate(&self) -> Result<()> {
        require_positive("frequency_hz", self.frequency_hz)?;
        require_positive("f_over_d", self.f_over_d)?;
        require_positive("waveguide_radius_m", self.waveguide_radius_m)?;
        if self.samples < 2 {
            return Err(PatternError::InvalidParameter {
                name: "samples",
                value: self.samples as f64,
            });
        }
        if !self.theta_min_deg.is_finite()
            || !self.theta_max_deg.is_finite()
            || self.theta_max_deg <= self.theta_min_deg
        {
            return Err(PatternError::InvalidParameter {
                name: "theta_max_deg",
                value: self.theta_max_deg,
            });
        }
        Ok(())
    }

    /// Evenly spaced sample angles, endpoints included
    pub fn sample_angles(&self) -> Vec<f64> {
        let step = (self.theta_max_deg - self.theta_min_deg) / (self.samples - 1) as f64;
        (0..self.samples)
            .map(|i| self.theta_min_deg + step * i as f64)
            .collect()
    }

    /// Compute the normalized pattern table
    pub fn generate(&self) -> Result<AntennaPattern> {
        self.validate()?;
        let diameter = self.diameter_m()?;

        let k = 2.0 * PI / wavelength_m(self.frequency_hz);
        let radius = diameter / 2.0;

        let lambda_c = TE11_CUTOFF_FACTOR * self.waveguide_radius_m;
        let k_c = 2.0 * PI / lambda_c;

        let theta_deg = self.sample_angles();

        let feed: Vec<f64> = theta_deg
            .iter()
            .map(|t| j1_over_x(k_c * self.waveguide_radius_m * t.to_radians().sin()))
            .collect();
        let feed_peak = feed.iter().fold(0.0_f64, |m, e| m.max(e.abs()));

        let total: Vec<f64> = theta_deg
            .iter()
            .zip(&feed)
            .map(|(t, e)| {
                let e_norm = if feed_peak > 0.0 { e / feed_peak } else { *e };
                e_norm.powi(2) * airy_power(k * radius * t.to_radians().sin())
            })
            .collect();
        let total_peak = total.iter().copied().fold(0.0_f64, f64::max);

        let gain_db: Vec<f64> = total
            .iter()
            .map(|p| {
                let norm = if total_peak > 0.0 { p / total_peak } else { *p };
                (10.0 * norm.max(LINEAR_FLOOR).log10()).max(PATTERN_FLOOR_DB)
            })
            .collect();

        debug!(
            "Generated {} pattern samples: D={:.4} m, f={:.3} GHz, θ∈[{}, {}]°",
            gain_db.len(),
            diameter,
            self.frequency_hz / 1e9,
            self.theta_min_deg,
            self.theta_max_deg
        );

        AntennaPattern::new(theta_deg, gain_db)
    }
}
