//! Spot-Beam Footprint Generator
//!
//! Projects a GEO spot beam onto the ground as an ellipse per contour level.
//!
//! # Footprint Model
//!
//! ```text
//! ang      = central angle SSP → beam center, clipped to [0°, 85°]
//! minor    = angular radius at the contour level
//! major    = minor / cos(ang)
//! rotation = (90° − azimuth(SSP → center)) mod 360°
//! ```
//!
//! The angular radius of each contour comes from a [`BeamRadius`] mode: a
//! fixed value, the antenna pattern's own angle at the contour gain, or a
//! reference width scaled by the pattern's contour ratios.

use antenna_pattern::PatternError;
use orbital_geometry::GeodeticPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ellipse;
pub mod export;

pub use ellipse::{ellipse_points, SpotBeamGenerator};
pub use export::to_geojson;

/// Maximum central angle used for the elongation factor (degrees)
pub const MAX_CENTRAL_ANGLE_DEG: f64 = 85.0;

/// Default fixed angular radius (degrees)
pub const DEFAULT_RADIUS_DEG: f64 = 0.25;

/// Contour levels drawn when none are requested (dB relative to peak)
pub const DEFAULT_LEVELS_DB: [f64; 3] = [-1.0, -2.0, -3.0];

/// Polygon vertices per contour, first and last coinciding
pub const DEFAULT_VERTICES: usize = 100;

/// Half-power level that anchors the scaled radius mode
pub const HALF_POWER_DB: f64 = -3.0;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("Ellipse needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("Invalid radius {radius_deg}° at {level_db} dB")]
    InvalidRadius { level_db: f64, radius_deg: f64 },
    #[error("Radius mode needs an antenna pattern")]
    MissingPattern,
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

pub type Result<T> = std::result::Result<T, FootprintError>;

/// How each contour's angular radius is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BeamRadius {
    /// Same radius at every level
    Fixed { radius_deg: f64 },
    /// Radius is the pattern's off-axis angle at the level gain
    PatternDerived,
    /// Reference width at −3 dB, other levels scaled by θ(level)/θ(−3 dB)
    ScaledToReference { reference_deg: f64 },
}

impl Default for BeamRadius {
    fn default() -> Self {
        BeamRadius::Fixed {
            radius_deg: DEFAULT_RADIUS_DEG,
        }
    }
}

/// One closed contour polygon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourLevel {
    /// Contour gain relative to peak (dB)
    pub gain_db: f64,
    /// Angular radius used for this contour (degrees)
    pub half_beamwidth_deg: f64,
    pub major_axis_deg: f64,
    pub minor_axis_deg: f64,
    /// Closed loop, first point repeated at the end
    pub polygon: Vec<GeodeticPoint>,
}

/// Ground footprint of one beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotBeamFootprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beam_id: Option<u32>,
    pub center: GeodeticPoint,
    /// Central angle SSP → center after clipping (degrees)
    pub angular_separation_deg: f64,
    /// Nominal axes: the half-power contour if requested, else the first contour
    pub major_axis_deg: f64,
    pub minor_axis_deg: f64,
    pub rotation_deg: f64,
    /// In the order the levels were requested
    pub contours: Vec<ContourLevel>,
}

impl SpotBeamFootprint {
    pub fn with_beam_id(mut self, beam_id: u32) -> Self {
        self.beam_id = Some(beam_id);
        self
    }

    /// Contour drawn at `gain_db`, if requested
    pub fn contour(&self, gain_db: f64) -> Option<&ContourLevel> {
        self.contours.iter().find(|c| c.gain_db == gain_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_mode_serde() {
        let fixed: BeamRadius = serde_json::from_str(r#"{"mode": "fixed", "radius_deg": 0.4}"#).unwrap();
        assert_eq!(fixed, BeamRadius::Fixed { radius_deg: 0.4 });

        let derived: BeamRadius = serde_json::from_str(r#"{"mode": "pattern_derived"}"#).unwrap();
        assert_eq!(derived, BeamRadius::PatternDerived);

        assert_eq!(BeamRadius::default(), BeamRadius::Fixed { radius_deg: 0.25 });
    }
}
