//! Beam selection, ranking and the downlink pipeline

use crate::loader::validate_observer;
use crate::{
    Beam, BeamCatalog, BestBeam, DownlinkReport, DownlinkRequest, Result, SelectorError,
};
use antenna_pattern::Antenna;
use orbital_geometry::{haversine_km, off_axis, GeodeticPoint, Satellite};
use spot_beam::{SpotBeamFootprint, SpotBeamGenerator};
use tracing::{debug, info};

/// Coarse phase: beam whose center is closest to the observer on the surface.
/// Ties keep the earlier beam.
pub fn nearest_beam<'a>(observer: &GeodeticPoint, beams: &'a [Beam]) -> Result<(&'a Beam, f64)> {
    beams
        .iter()
        .map(|b| (b, haversine_km(observer, &b.center)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or(SelectorError::NoBeams)
}

/// Refine phase: off-axis geometry and directivity for one beam
pub fn refine(
    observer: &GeodeticPoint,
    satellite: &Satellite,
    beam: &Beam,
    antenna: &Antenna,
    surface_distance_km: f64,
) -> BestBeam {
    let look = off_axis(&satellite.position(), &beam.center, observer);
    let relative_gain_db = antenna.pattern.gain_at(look.angle_deg);

    debug!(
        "Beam {}: off-axis {:.4}°, slant {:.1} km, G_rel {:.2} dB",
        beam.id, look.angle_deg, look.slant_range_km, relative_gain_db
    );

    BestBeam {
        beam_id: beam.id,
        beam_name: beam.name.clone(),
        antenna_id: beam.antenna_id,
        center: beam.center,
        surface_distance_km,
        off_axis_deg: look.angle_deg,
        slant_range_km: look.slant_range_km,
        relative_gain_db,
        directivity_dbi: antenna.peak_directivity_dbi + relative_gain_db,
    }
}

/// Two-phase selection of the serving beam for `observer`
pub fn select_best_beam<C: BeamCatalog + ?Sized>(
    catalog: &C,
    satellite: &Satellite,
    observer: &GeodeticPoint,
) -> Result<BestBeam> {
    validate_observer(observer)?;
    let beams = catalog.beams()?;
    let (beam, distance) = nearest_beam(observer, &beams)?;
    info!(
        "Nearest of {} beams: {} ({:.1} km from observer)",
        beams.len(),
        beam.id,
        distance
    );

    let antenna = catalog.antenna(beam.antenna_id)?;
    Ok(refine(observer, satellite, beam, &antenna, distance))
}

/// Refine the `shortlist` closest beams and order them by directivity
/// towards the observer, strongest first
pub fn rank_beams<C: BeamCatalog + ?Sized>(
    catalog: &C,
    satellite: &Satellite,
    observer: &GeodeticPoint,
    shortlist: usize,
) -> Result<Vec<BestBeam>> {
    validate_observer(observer)?;
    let beams = catalog.beams()?;
    if beams.is_empty() {
        return Err(SelectorError::NoBeams);
    }

    let mut by_distance: Vec<(&Beam, f64)> = beams
        .iter()
        .map(|b| (b, haversine_km(observer, &b.center)))
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_distance.truncate(shortlist.clamp(1, beams.len()));

    let mut ranked = by_distance
        .into_iter()
        .map(|(beam, distance)| {
            let antenna = catalog.antenna(beam.antenna_id)?;
            Ok(refine(observer, satellite, beam, &antenna, distance))
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.directivity_dbi.total_cmp(&a.directivity_dbi));
    info!("Ranked {} closest beams", ranked.len());

    Ok(ranked)
}

/// Selection followed by the link budget towards the chosen beam
pub fn evaluate_downlink<C: BeamCatalog + ?Sized>(
    catalog: &C,
    request: &DownlinkRequest,
) -> Result<DownlinkReport> {
    request.link_params.validate()?;

    let satellite = catalog.satellite(request.satellite_id)?;
    let best_beam = select_best_beam(catalog, &satellite, &request.observer)?;

    let link_budget = link_budget::evaluate(
        best_beam.directivity_dbi,
        best_beam.slant_range_km,
        &request.link_params,
    )?;

    info!(
        "Downlink via beam {}: CINR {:.2} dB ({})",
        best_beam.beam_id,
        link_budget.cinr_db,
        link_budget.quality.label()
    );

    Ok(DownlinkReport {
        satellite_id: satellite.id,
        observer: request.observer,
        best_beam,
        link_params: request.link_params.clone(),
        quality_label: link_budget.quality.label().to_string(),
        link_budget,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Footprints of every catalog beam as seen from `satellite`
pub fn footprints<C: BeamCatalog + ?Sized>(
    catalog: &C,
    satellite: &Satellite,
    generator: &SpotBeamGenerator,
) -> Result<Vec<SpotBeamFootprint>> {
    let beams = catalog.beams()?;
    info!(
        "Generating footprints for {} beams ({} levels, {:?})",
        beams.len(),
        generator.levels_db.len(),
        generator.radius
    );

    beams
        .iter()
        .map(|beam| {
            let antenna = catalog.antenna(beam.antenna_id)?;
            let footprint = generator.footprint(&beam.center, satellite, Some(&antenna.pattern))?;
            Ok(footprint.with_beam_id(beam.id))
        })
        .collect()
}
