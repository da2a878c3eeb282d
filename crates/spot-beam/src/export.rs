//! GeoJSON export of footprint contours

use crate::SpotBeamFootprint;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

/// One polygon feature per contour, coordinates as `[lon, lat]`
pub fn to_geojson(footprints: &[SpotBeamFootprint]) -> FeatureCollection {
    let features = footprints
        .iter()
        .flat_map(|footprint| {
            footprint.contours.iter().map(move |contour| {
                let ring: Vec<Vec<f64>> = contour
                    .polygon
                    .iter()
                    .map(|p| vec![p.longitude, p.latitude])
                    .collect();

                let mut properties = JsonObject::new();
                if let Some(beam_id) = footprint.beam_id {
                    properties.insert("beam_id".to_string(), json!(beam_id));
                }
                properties.insert("level_db".to_string(), json!(contour.gain_db));
                properties.insert("half_beamwidth_deg".to_string(), json!(contour.half_beamwidth_deg));
                properties.insert("major_axis_deg".to_string(), json!(contour.major_axis_deg));
                properties.insert("minor_axis_deg".to_string(), json!(contour.minor_axis_deg));
                properties.insert("rotation_deg".to_string(), json!(footprint.rotation_deg));
                properties.insert(
                    "center".to_string(),
                    json!([footprint.center.longitude, footprint.center.latitude]),
                );

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
