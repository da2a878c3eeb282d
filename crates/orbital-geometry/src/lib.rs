//! Orbital Geometry Library
//!
//! Spherical-Earth coordinate transforms and the GEO look geometry shared by
//! the spot-beam and beam-selection crates:
//! - Geodetic to ECEF conversion
//! - Great-circle (haversine) distance and central angle
//! - Initial bearing between ground points
//! - Off-axis angle and slant range as seen from the satellite
//!
//! Every function uses the same mean Earth radius. There is no ellipsoidal
//! correction anywhere in the workspace.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geostationary altitude above the surface in km
pub const GEO_ALTITUDE_KM: f64 = 35786.0;

/// Default sub-satellite longitude for catalog records that omit it
pub const DEFAULT_GEO_LONGITUDE: f64 = 146.0;

/// Earth-centered earth-fixed position in km
pub type EcefVector = Vector3<f64>;

/// Geodetic position (degrees, km above the sphere)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64, altitude_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_km,
        }
    }

    /// Point on the surface
    pub fn ground(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, 0.0)
    }

    pub fn to_ecef(&self) -> EcefVector {
        transforms::geodetic_to_ecef(self)
    }

    /// Same lat/lon dropped to the surface
    pub fn on_ground(&self) -> Self {
        Self::ground(self.latitude, self.longitude)
    }
}

/// Satellite record as resolved from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Sub-satellite latitude (0 for GEO)
    #[serde(default)]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_altitude")]
    pub altitude_km: f64,
}

fn default_longitude() -> f64 {
    DEFAULT_GEO_LONGITUDE
}

fn default_altitude() -> f64 {
    GEO_ALTITUDE_KM
}

impl Satellite {
    /// Geostationary satellite parked over `longitude`
    pub fn geostationary(id: u32, name: impl Into<String>, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: 0.0,
            longitude,
            altitude_km: GEO_ALTITUDE_KM,
        }
    }

    pub fn position(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.latitude, self.longitude, self.altitude_km)
    }

    /// Ground point directly beneath the satellite
    pub fn sub_satellite_point(&self) -> GeodeticPoint {
        GeodeticPoint::ground(self.latitude, self.longitude)
    }
}

/// Off-boresight geometry of a ground point relative to a beam's aiming point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffAxis {
    /// Angle at the satellite between target and observer directions
    pub angle_deg: f64,
    /// Satellite to observer distance in km
    pub slant_range_km: f64,
}

pub mod transforms {
    use super::*;

    pub fn geodetic_to_ecef(pos: &GeodeticPoint) -> EcefVector {
        let lat_rad = pos.latitude.to_radians();
        let lon_rad = pos.longitude.to_radians();
        let r = EARTH_RADIUS_KM + pos.altitude_km;

        Vector3::new(
            r * lat_rad.cos() * lon_rad.cos(),
            r * lat_rad.cos() * lon_rad.sin(),
            r * lat_rad.sin(),
        )
    }
}

pub mod spherical {
    use super::*;

    /// Haversine distance between two points in km
    pub fn haversine_km(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let dlat = (b.latitude - a.latitude).to_radians();
        let dlon = (b.longitude - a.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Central angle between two surface points (spherical law of cosines), degrees
    pub fn central_angle_deg(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let dlon = (b.longitude - a.longitude).to_radians();

        let cos_c = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos();
        cos_c.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Initial bearing from `from` to `to`, degrees clockwise from north in (-180, 180]
    pub fn initial_bearing_deg(from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        let lat1 = from.latitude.to_radians();
        let lat2 = to.latitude.to_radians();
        let dlon = (to.longitude - from.longitude).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

        y.atan2(x).to_degrees()
    }
}

pub mod look {
    use super::*;

    /// Off-axis angle and slant range of `observer` relative to `beam_target`,
    /// both taken on the surface, as seen from `satellite`.
    pub fn off_axis(
        satellite: &GeodeticPoint,
        beam_target: &GeodeticPoint,
        observer: &GeodeticPoint,
    ) -> OffAxis {
        let sat = satellite.to_ecef();
        let to_target = beam_target.on_ground().to_ecef() - sat;
        let to_observer = observer.on_ground().to_ecef() - sat;

        let slant_range_km = to_observer.norm();
        let denom = to_target.norm() * slant_range_km;

        // Satellite sitting on one of the points: no direction to compare
        let angle_deg = if denom > 0.0 {
            let cos_theta = (to_observer.dot(&to_target) / denom).clamp(-1.0, 1.0);
            cos_theta.acos().to_degrees()
        } else {
            0.0
        };

        OffAxis {
            angle_deg,
            slant_range_km,
        }
    }
}

pub use look::off_axis;
pub use spherical::{central_angle_deg, haversine_km, initial_bearing_deg};
pub use transforms::geodetic_to_ecef;


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn point_strategy() -> impl Strategy<Value = GeodeticPoint> {
        (-89.0f64..89.0, -180.0f64..180.0).prop_map(|(lat, lon)| GeodeticPoint::ground(lat, lon))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        #[test]
        fn fuzz_haversine_zero_on_identity(p in point_strategy()) {
            prop_assert_eq!(haversine_km(&p, &p), 0.0);
        }

        #[test]
        fn fuzz_haversine_symmetric(a in point_strategy(), b in point_strategy()) {
            let ab = haversine_km(&a, &b);
            let ba = haversine_km(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }

        #[test]
        fn fuzz_off_axis_bounded(target in point_strategy(), observer in point_strategy()) {
            let sat = Satellite::geostationary(1, "fuzz", 146.0).position();
            let geom = off_axis(&sat, &target, &observer);
            prop_assert!(geom.angle_deg.is_finite());
            prop_assert!((0.0..=180.0).contains(&geom.angle_deg));
            prop_assert!(geom.slant_range_km > 0.0);
        }
    }
}
