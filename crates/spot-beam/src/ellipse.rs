//! Ellipse geometry and per-level contour construction

use crate::{
    BeamRadius, ContourLevel, FootprintError, Result, SpotBeamFootprint, DEFAULT_LEVELS_DB,
    DEFAULT_VERTICES, HALF_POWER_DB, MAX_CENTRAL_ANGLE_DEG,
};
use antenna_pattern::AntennaPattern;
use orbital_geometry::{central_angle_deg, initial_bearing_deg, GeodeticPoint, Satellite};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Sample an ellipse around `center`.
///
/// `major` and `minor` are full axis lengths in degrees; the polygon uses
/// half of each. The major axis lies along longitude before rotation.
/// Returns `vertices` points with the last equal to the first.
pub fn ellipse_points(
    center: &GeodeticPoint,
    major: f64,
    minor: f64,
    rotation_deg: f64,
    vertices: usize,
) -> Result<Vec<GeodeticPoint>> {
    if vertices < 3 {
        return Err(FootprintError::TooFewVertices(vertices));
    }

    let rot = rotation_deg.to_radians();
    let (sin_r, cos_r) = rot.sin_cos();
    let step = 2.0 * PI / (vertices - 1) as f64;

    let mut points: Vec<GeodeticPoint> = (0..vertices - 1)
        .map(|i| {
            let t = step * i as f64;
            let x = major / 2.0 * t.cos();
            let y = minor / 2.0 * t.sin();
            let xr = x * cos_r - y * sin_r;
            let yr = x * sin_r + y * cos_r;
            GeodeticPoint::ground(center.latitude + yr, center.longitude + xr)
        })
        .collect();
    points.push(points[0]);

    Ok(points)
}

/// Central angle SSP → center (clipped) and ellipse rotation, both in degrees
pub fn orientation(center: &GeodeticPoint, satellite: &Satellite) -> (f64, f64) {
    let ssp = satellite.sub_satellite_point();

    let raw = central_angle_deg(center, &ssp);
    let ang = raw.clamp(0.0, MAX_CENTRAL_ANGLE_DEG);
    if ang != raw {
        debug!(
            "Central angle {:.3}° to ({:.3}, {:.3}) clipped to {}°",
            raw, center.latitude, center.longitude, MAX_CENTRAL_ANGLE_DEG
        );
    }

    let azimuth = initial_bearing_deg(&ssp, center);
    let rotation = (90.0 - azimuth).rem_euclid(360.0);

    (ang, rotation)
}

/// Footprint settings: radius mode, contour levels and polygon resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotBeamGenerator {
    #[serde(default)]
    pub radius: BeamRadius,
    #[serde(default = "default_levels")]
    pub levels_db: Vec<f64>,
    #[serde(default = "default_vertices")]
    pub vertices: usize,
}

fn default_levels() -> Vec<f64> {
    DEFAULT_LEVELS_DB.to_vec()
}

fn default_vertices() -> usize {
    DEFAULT_VERTICES
}

impl Default for SpotBeamGenerator {
    fn default() -> Self {
        Self {
            radius: BeamRadius::default(),
            levels_db: default_levels(),
            vertices: DEFAULT_VERTICES,
        }
    }
}

impl SpotBeamGenerator {
    pub fn new(radius: BeamRadius) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    pub fn with_levels(mut self, levels_db: Vec<f64>) -> Self {
        self.levels_db = levels_db;
        self
    }

    pub fn with_vertices(mut self, vertices: usize) -> Self {
        self.vertices = vertices;
        self
    }

    /// Angular radius (degrees) of the contour at `level_db`
    pub fn radius_for(&self, level_db: f64, pattern: Option<&AntennaPattern>) -> Result<f64> {
        let radius_deg = match self.radius {
            BeamRadius::Fixed { radius_deg } => radius_deg,
            BeamRadius::PatternDerived => {
                let pattern = pattern.ok_or(FootprintError::MissingPattern)?;
                pattern.theta_at(level_db)?
            }
            BeamRadius::ScaledToReference { reference_deg } => {
                let pattern = pattern.ok_or(FootprintError::MissingPattern)?;
                reference_deg * scale_ratio(pattern, level_db)
            }
        };

        if !radius_deg.is_finite() || radius_deg <= 0.0 {
            return Err(FootprintError::InvalidRadius {
                level_db,
                radius_deg,
            });
        }
        Ok(radius_deg)
    }

    /// Build the footprint of a beam aimed at `center`.
    ///
    /// The nominal axes are those of the −3 dB contour when it is among
    /// `levels_db`, otherwise those of the first level. Only an empty level
    /// list evaluates the −3 dB radius on its own.
    pub fn footprint(
        &self,
        center: &GeodeticPoint,
        satellite: &Satellite,
        pattern: Option<&AntennaPattern>,
    ) -> Result<SpotBeamFootprint> {
        if self.vertices < 3 {
            return Err(FootprintError::TooFewVertices(self.vertices));
        }

        let (ang, rotation_deg) = orientation(center, satellite);
        let elongation = 1.0 / ang.to_radians().cos();

        let contours = self
            .levels_db
            .iter()
            .map(|&level_db| {
                let minor = self.radius_for(level_db, pattern)?;
                let major = minor * elongation;
                Ok(ContourLevel {
                    gain_db: level_db,
                    half_beamwidth_deg: minor,
                    major_axis_deg: major,
                    minor_axis_deg: minor,
                    polygon: ellipse_points(center, major, minor, rotation_deg, self.vertices)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Nominal axes follow the half-power contour, else the first requested one
        let nominal = match contours
            .iter()
            .find(|c| c.gain_db == HALF_POWER_DB)
            .or_else(|| contours.first())
        {
            Some(contour) => contour.minor_axis_deg,
            None => self.radius_for(HALF_POWER_DB, pattern)?,
        };

        Ok(SpotBeamFootprint {
            beam_id: None,
            center: center.on_ground(),
            angular_separation_deg: ang,
            major_axis_deg: nominal * elongation,
            minor_axis_deg: nominal,
            rotation_deg,
            contours,
        })
    }
}

/// θ(level)/θ(−3 dB), or a linear fallback (0.6 at −1 dB, 0.8 at −2 dB,
/// 1.0 at −3 dB) when the pattern has no usable half-power angle
fn scale_ratio(pattern: &AntennaPattern, level_db: f64) -> f64 {
    let half_power = pattern.theta_at(HALF_POWER_DB).ok().filter(|t| t.is_finite() && *t > 0.0);

    match (half_power, pattern.theta_at(level_db)) {
        (Some(theta_3db), Ok(theta)) => theta / theta_3db,
        _ => {
            debug!("No usable half-power angle, using fallback ratio at {} dB", level_db);
            1.0 - 0.2 * (level_db - HALF_POWER_DB)
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn fuzz_ellipse_closed_and_bounded(
            lat in -60.0f64..60.0,
            lon in -180.0f64..180.0,
            major in 0.01f64..5.0,
            ratio in 0.1f64..1.0,
            rotation in 0.0f64..360.0,
            vertices in 3usize..200,
        ) {
            let center = GeodeticPoint::ground(lat, lon);
            let minor = major * ratio;
            let points = ellipse_points(&center, major, minor, rotation, vertices).unwrap();

            prop_assert_eq!(points.len(), vertices);
            prop_assert_eq!(points[0], points[vertices - 1]);
            for p in &points {
                let d = ((p.latitude - lat).powi(2) + (p.longitude - lon).powi(2)).sqrt();
                prop_assert!(d <= major / 2.0 + 1e-9);
                prop_assert!(d >= minor / 2.0 - 1e-9);
            }
        }
    }
}
