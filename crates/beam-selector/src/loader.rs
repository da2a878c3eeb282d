//! Catalog access: the data-fetch trait and its JSON file implementation

use crate::{Beam, Result, SelectorError};
use antenna_pattern::{Antenna, AntennaPattern, PatternSamples};
use orbital_geometry::{GeodeticPoint, Satellite, DEFAULT_GEO_LONGITUDE, GEO_ALTITUDE_KM};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Read access to satellites, antennas and beams
pub trait BeamCatalog {
    /// Satellite by id, or the lowest-id satellite when `id` is `None`
    fn satellite(&self, id: Option<u32>) -> Result<Satellite>;

    fn beams(&self) -> Result<Vec<Beam>>;

    fn antenna(&self, id: u32) -> Result<Antenna>;
}

fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Either [-180, 180] or [0, 360) convention is accepted
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..360.0).contains(&lon) && lon.is_finite()
}

/// Reject observer coordinates the catalog itself would not accept
pub(crate) fn validate_observer(observer: &GeodeticPoint) -> Result<()> {
    if is_valid_latitude(observer.latitude) && is_valid_longitude(observer.longitude) {
        Ok(())
    } else {
        Err(SelectorError::InvalidObserver {
            latitude: observer.latitude,
            longitude: observer.longitude,
        })
    }
}

/// Drop control characters and cap the length
fn sanitize_name(name: String) -> String {
    name.chars().filter(|c| !c.is_control()).take(256).collect()
}

#[derive(Debug, Deserialize)]
struct RawSatellite {
    id: Option<u32>,
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAntenna {
    id: Option<u32>,
    name: Option<String>,
    #[serde(alias = "directivity")]
    peak_directivity_dbi: Option<f64>,
    pattern: Option<PatternSamples>,
}

#[derive(Debug, Deserialize)]
struct RawBeam {
    id: Option<u32>,
    name: Option<String>,
    center_lat: Option<f64>,
    center_lon: Option<f64>,
    antenna_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    satellites: Vec<RawSatellite>,
    #[serde(default)]
    antennas: Vec<RawAntenna>,
    #[serde(default)]
    beams: Vec<RawBeam>,
}

/// Catalog loaded from a single JSON document
/// `{ "satellites": [...], "antennas": [...], "beams": [...] }`
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    satellites: Vec<Satellite>,
    antennas: Vec<Antenna>,
    beams: Vec<Beam>,
    skipped: usize,
}

impl JsonCatalog {
    pub fn new(satellites: Vec<Satellite>, antennas: Vec<Antenna>, beams: Vec<Beam>) -> Self {
        let mut satellites = satellites;
        satellites.sort_by_key(|s| s.id);
        Self {
            satellites,
            antennas,
            beams,
            skipped: 0,
        }
    }

    /// Load and validate a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading catalog from {:?}", path);

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let raw: CatalogFile = serde_json::from_reader(reader)?;
        let mut skipped = 0;

        let mut satellites = Vec::new();
        for sat in raw.satellites {
            let Some(id) = sat.id else {
                skipped += 1;
                continue;
            };
            let latitude = sat.latitude.unwrap_or(0.0);
            let longitude = sat.longitude.unwrap_or(DEFAULT_GEO_LONGITUDE);
            let altitude_km = sat.altitude_km.unwrap_or(GEO_ALTITUDE_KM);
            if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) || !altitude_km.is_finite() {
                skipped += 1;
                continue;
            }
            satellites.push(Satellite {
                id,
                name: sanitize_name(sat.name.unwrap_or_default()),
                latitude,
                longitude,
                altitude_km,
            });
        }

        let mut antennas = Vec::new();
        for ant in raw.antennas {
            let (Some(id), Some(peak), Some(samples)) = (ant.id, ant.peak_directivity_dbi, ant.pattern) else {
                skipped += 1;
                continue;
            };
            match AntennaPattern::try_from(samples) {
                Ok(pattern) if peak.is_finite() => antennas.push(Antenna {
                    id,
                    name: sanitize_name(ant.name.unwrap_or_default()),
                    peak_directivity_dbi: peak,
                    pattern,
                }),
                Ok(_) => skipped += 1,
                Err(e) => {
                    warn!("Skipping antenna {}: {}", id, e);
                    skipped += 1;
                }
            }
        }

        let mut beams = Vec::new();
        for beam in raw.beams {
            let (Some(id), Some(lat), Some(lon), Some(antenna_id)) =
                (beam.id, beam.center_lat, beam.center_lon, beam.antenna_id)
            else {
                skipped += 1;
                continue;
            };
            if !is_valid_latitude(lat) || !is_valid_longitude(lon) {
                skipped += 1;
                continue;
            }
            beams.push(Beam {
                id,
                name: sanitize_name(beam.name.unwrap_or_else(|| format!("beam-{}", id))),
                center: GeodeticPoint::ground(lat, lon),
                antenna_id,
            });
        }

        info!(
            "Loaded {} satellites, {} antennas, {} beams ({} skipped)",
            satellites.len(),
            antennas.len(),
            beams.len(),
            skipped
        );

        let mut catalog = Self::new(satellites, antennas, beams);
        catalog.skipped = skipped;
        Ok(catalog)
    }

    /// Records dropped during loading for missing or invalid fields
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl BeamCatalog for JsonCatalog {
    fn satellite(&self, id: Option<u32>) -> Result<Satellite> {
        let found = match id {
            Some(id) => self.satellites.iter().find(|s| s.id == id),
            None => self.satellites.first(),
        };
        found.cloned().ok_or_else(|| match id {
            Some(id) => SelectorError::unavailable("satellite", id),
            None => SelectorError::unavailable("satellite", "default"),
        })
    }

    fn beams(&self) -> Result<Vec<Beam>> {
        Ok(self.beams.clone())
    }

    fn antenna(&self, id: u32) -> Result<Antenna> {
        self.antennas
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| SelectorError::unavailable("antenna", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"{
        "satellites": [
            {"id": 2, "name": "GEO-118", "longitude": 118.0},
            {"id": 1, "name": "GEO-146", "latitude": 0.0, "longitude": 146.0, "altitude_km": 35786.0},
            {"id": 3, "name": "Bad", "latitude": 95.0},
            {"name": "Anonymous", "longitude": 100.0}
        ],
        "antennas": [
            {"id": 10, "name": "Ka-A", "peak_directivity_dbi": 48.0,
             "pattern": {"theta_deg": [0.0, 1.0, 2.0], "gain_db": [0.0, -3.0, -12.0]}},
            {"id": 11, "directivity": 45.0,
             "pattern": {"theta_deg": [0.0], "gain_db": [0.0]}},
            {"id": 12, "name": "No pattern", "peak_directivity_dbi": 45.0}
        ],
        "beams": [
            {"id": 100, "name": "Bandung", "center_lat": -6.8, "center_lon": 107.6, "antenna_id": 10},
            {"id": 101, "center_lat": 3.6, "center_lon": 98.7, "antenna_id": 10},
            {"id": 102, "center_lat": -91.0, "center_lon": 98.7, "antenna_id": 10},
            {"id": 103, "center_lat": 1.0, "antenna_id": 10}
        ]
    }"#;

    fn write_catalog(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_catalog_skips_invalid() {
        let file = write_catalog(CATALOG);
        let catalog = JsonCatalog::load(file.path()).unwrap();

        // 2 satellites, 2 antennas, 2 beams rejected
        assert_eq!(catalog.skipped(), 6);
        assert_eq!(catalog.beams().unwrap().len(), 2);
        assert_eq!(catalog.beams().unwrap()[1].name, "beam-101");
        assert_eq!(catalog.antenna(10).unwrap().peak_directivity_dbi, 48.0);
    }

    #[test]
    fn test_default_satellite_is_lowest_id() {
        let file = write_catalog(CATALOG);
        let catalog = JsonCatalog::load(file.path()).unwrap();

        let sat = catalog.satellite(None).unwrap();
        assert_eq!(sat.id, 1);
        assert_eq!(catalog.satellite(Some(2)).unwrap().altitude_km, GEO_ALTITUDE_KM);
    }

    #[test]
    fn test_missing_records() {
        let file = write_catalog(CATALOG);
        let catalog = JsonCatalog::load(file.path()).unwrap();

        assert!(matches!(
            catalog.satellite(Some(3)),
            Err(SelectorError::ExternalDataUnavailable { kind: "satellite", .. })
        ));
        assert!(matches!(
            catalog.antenna(11),
            Err(SelectorError::ExternalDataUnavailable { kind: "antenna", .. })
        ));
        assert!(matches!(
            JsonCatalog::default().satellite(None),
            Err(SelectorError::ExternalDataUnavailable { .. })
        ));
    }

    #[test]
    fn test_satellite_without_id_is_skipped() {
        let json = r#"{"satellites": [
            {"name": "Anonymous", "longitude": 118.0},
            {"id": 0, "name": "GEO-146", "longitude": 146.0}
        ]}"#;
        let catalog = JsonCatalog::from_reader(json.as_bytes()).unwrap();

        assert_eq!(catalog.skipped(), 1);
        assert_eq!(catalog.satellite(Some(0)).unwrap().longitude, 146.0);
        assert_eq!(catalog.satellite(None).unwrap().name, "GEO-146");
    }

    #[test]
    fn test_observer_validation() {
        assert!(validate_observer(&GeodeticPoint::ground(-6.8, 107.6)).is_ok());
        assert!(validate_observer(&GeodeticPoint::ground(0.0, 350.0)).is_ok());
        for (lat, lon) in [(95.0, 100.0), (f64::NAN, 100.0), (0.0, 400.0), (0.0, f64::INFINITY)] {
            assert!(matches!(
                validate_observer(&GeodeticPoint::ground(lat, lon)),
                Err(SelectorError::InvalidObserver { .. })
            ));
        }
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            JsonCatalog::load("/nonexistent/catalog.json"),
            Err(SelectorError::Io(_))
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_catalog("{ not json");
        assert!(matches!(JsonCatalog::load(file.path()), Err(SelectorError::Json(_))));
    }

    #[test]
    fn test_bundled_catalog() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json");
        let catalog = JsonCatalog::load(path).unwrap();

        assert_eq!(catalog.skipped(), 0);
        assert_eq!(catalog.beams().unwrap().len(), 7);
        assert_eq!(catalog.satellite(None).unwrap().longitude, 146.0);
        let antenna = catalog.antenna(1).unwrap();
        assert_eq!(antenna.pattern.gain_db()[0], 0.0);
    }
}
