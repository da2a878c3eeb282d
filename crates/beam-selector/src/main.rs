//! Spot-Beam CLI
//!
//! Pattern generation, footprint contours, beam selection and downlink CINR.
//!
//! Usage:
//!   spotbeam pattern --frequency-ghz 18 --diameter-m 2.0341
//!   spotbeam ellipse --catalog data/catalog.json --radius-mode pattern --geojson
//!   spotbeam best-beam --catalog data/catalog.json --lat 3.0 --lon 98.0 --rank 5
//!   spotbeam downlink --catalog data/catalog.json --lat -6.9 --lon 107.6 --params link.json

use anyhow::{Context, Result};
use antenna_pattern::{size_from_beamwidth, Aperture, RadiationModel};
use beam_selector::{
    evaluate_downlink, footprints, rank_beams, select_best_beam, BeamCatalog, DownlinkRequest,
    JsonCatalog, DEFAULT_SHORTLIST,
};
use clap::{Parser, Subcommand, ValueEnum};
use link_budget::LinkBudgetParameters;
use orbital_geometry::GeodeticPoint;
use serde::Serialize;
use spot_beam::{to_geojson, BeamRadius, SpotBeamGenerator, DEFAULT_RADIUS_DEG, DEFAULT_VERTICES};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "spotbeam",
    about = "GEO spot-beam geometry, antenna patterns and downlink CINR"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output file (stdout when omitted)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a normalized radiation pattern from the reflector model
    Pattern {
        #[arg(long, default_value_t = 18.0)]
        frequency_ghz: f64,
        /// Reflector diameter in metres
        #[arg(long, conflicts_with_all = ["directivity_dbi", "beamwidth_deg"])]
        diameter_m: Option<f64>,
        /// Size the reflector from a peak directivity
        #[arg(long, conflicts_with = "beamwidth_deg")]
        directivity_dbi: Option<f64>,
        /// Aperture efficiency used with --directivity-dbi
        #[arg(long, default_value_t = 0.65)]
        efficiency: f64,
        /// Size the reflector from a −3 dB beamwidth
        #[arg(long)]
        beamwidth_deg: Option<f64>,
        #[arg(long, default_value_t = 1.27)]
        f_over_d: f64,
        #[arg(long, default_value_t = 0.002)]
        waveguide_radius_m: f64,
        #[arg(long, default_value_t = 12.0)]
        theta_max_deg: f64,
        #[arg(long, default_value_t = 1000)]
        samples: usize,
    },

    /// Peak directivity and reflector size for a beamwidth
    Directivity {
        #[arg(long, default_value_t = 20.0)]
        frequency_ghz: f64,
        #[arg(long)]
        beamwidth_deg: f64,
        #[arg(long, default_value_t = antenna_pattern::aperture::DEFAULT_APERTURE_EFFICIENCY)]
        efficiency: f64,
    },

    /// Footprint contours for every catalog beam
    Ellipse {
        #[command(flatten)]
        source: CatalogArgs,
        #[arg(long, value_enum, default_value_t = RadiusMode::Fixed)]
        radius_mode: RadiusMode,
        /// Radius for --radius-mode fixed, reference width for scaled
        #[arg(long, default_value_t = DEFAULT_RADIUS_DEG)]
        radius_deg: f64,
        /// Contour levels in dB
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, default_values_t = [-1.0, -2.0, -3.0])]
        levels: Vec<f64>,
        #[arg(long, default_value_t = DEFAULT_VERTICES)]
        vertices: usize,
        /// Write a GeoJSON FeatureCollection instead of JSON footprints
        #[arg(long)]
        geojson: bool,
    },

    /// Serving beam for an observer
    BestBeam {
        #[command(flatten)]
        source: CatalogArgs,
        #[command(flatten)]
        observer: ObserverArgs,
        /// Rank the N closest beams by directivity instead
        #[arg(long, num_args = 0..=1, default_missing_value = "5")]
        rank: Option<usize>,
    },

    /// Standalone link budget
    LinkBudget {
        #[arg(long, allow_negative_numbers = true)]
        tx_directivity_dbi: f64,
        #[arg(long)]
        distance_km: f64,
        /// JSON file overriding the default link parameters
        #[arg(long)]
        params: Option<PathBuf>,
    },

    /// Beam selection followed by the downlink budget
    Downlink {
        #[command(flatten)]
        source: CatalogArgs,
        #[command(flatten)]
        observer: ObserverArgs,
        /// JSON file overriding the default link parameters
        #[arg(long)]
        params: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// Catalog JSON with satellites, antennas and beams
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,
    /// Satellite id (lowest id when omitted)
    #[arg(short, long)]
    satellite_id: Option<u32>,
}

#[derive(clap::Args, Debug)]
struct ObserverArgs {
    /// Observer latitude (degrees)
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Observer longitude (degrees)
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
}

impl ObserverArgs {
    fn point(&self) -> GeodeticPoint {
        GeodeticPoint::ground(self.lat, self.lon)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RadiusMode {
    Fixed,
    Pattern,
    Scaled,
}

#[derive(Serialize)]
struct PatternReport {
    model: RadiationModel,
    diameter_m: f64,
    half_power_deg: Option<f64>,
    theta_deg: Vec<f64>,
    gain_db: Vec<f64>,
    generated_at: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let output = args.output.as_deref();

    match args.command {
        Command::Pattern {
            frequency_ghz,
            diameter_m,
            directivity_dbi,
            efficiency,
            beamwidth_deg,
            f_over_d,
            waveguide_radius_m,
            theta_max_deg,
            samples,
        } => {
            let aperture = match (diameter_m, directivity_dbi, beamwidth_deg) {
                (Some(meters), _, _) => Aperture::Diameter { meters },
                (None, Some(dbi), _) => Aperture::Directivity { dbi, efficiency },
                (None, None, Some(bw3db_deg)) => Aperture::Beamwidth { bw3db_deg },
                (None, None, None) => RadiationModel::default().aperture,
            };
            let model = RadiationModel {
                frequency_hz: frequency_ghz * 1e9,
                aperture,
                f_over_d,
                waveguide_radius_m,
                theta_max_deg,
                samples,
                ..RadiationModel::default()
            };

            let pattern = model.generate()?;
            let diameter_m = model.diameter_m()?;
            let half_power_deg = pattern.theta_at(-3.0).ok();
            info!(
                "Pattern: {} samples, D = {:.4} m, θ3dB = {:?}°",
                pattern.len(),
                diameter_m,
                half_power_deg
            );

            let report = PatternReport {
                model,
                diameter_m,
                half_power_deg,
                theta_deg: pattern.theta_deg().to_vec(),
                gain_db: pattern.gain_db().to_vec(),
                generated_at: chrono::Utc::now().to_rfc3339(),
            };
            write_json(output, &report)?;
        }

        Command::Directivity {
            frequency_ghz,
            beamwidth_deg,
            efficiency,
        } => {
            let sizing = size_from_beamwidth(frequency_ghz, beamwidth_deg, efficiency)?;
            info!(
                "D = {:.4} m, directivity = {:.2} dBi",
                sizing.diameter_m, sizing.directivity_dbi
            );
            write_json(output, &sizing)?;
        }

        Command::Ellipse {
            source,
            radius_mode,
            radius_deg,
            levels,
            vertices,
            geojson,
        } => {
            let catalog = JsonCatalog::load(&source.catalog)?;
            let satellite = catalog.satellite(source.satellite_id)?;

            let radius = match radius_mode {
                RadiusMode::Fixed => BeamRadius::Fixed { radius_deg },
                RadiusMode::Pattern => BeamRadius::PatternDerived,
                RadiusMode::Scaled => BeamRadius::ScaledToReference {
                    reference_deg: radius_deg,
                },
            };
            let generator = SpotBeamGenerator::new(radius)
                .with_levels(levels)
                .with_vertices(vertices);

            let all = footprints(&catalog, &satellite, &generator)?;
            info!("Generated {} footprints from satellite {}", all.len(), satellite.id);

            if geojson {
                write_json(output, &to_geojson(&all))?;
            } else {
                write_json(output, &all)?;
            }
        }

        Command::BestBeam {
            source,
            observer,
            rank,
        } => {
            let catalog = JsonCatalog::load(&source.catalog)?;
            let satellite = catalog.satellite(source.satellite_id)?;
            let observer = observer.point();

            match rank {
                Some(n) => {
                    let shortlist = if n == 0 { DEFAULT_SHORTLIST } else { n };
                    let ranked = rank_beams(&catalog, &satellite, &observer, shortlist)?;
                    for (i, b) in ranked.iter().enumerate() {
                        info!(
                            "  #{} beam {:>4} | {:8.1} km | θ {:6.3}° | {:6.2} dBi",
                            i + 1,
                            b.beam_id,
                            b.surface_distance_km,
                            b.off_axis_deg,
                            b.directivity_dbi
                        );
                    }
                    write_json(output, &ranked)?;
                }
                None => {
                    let best = select_best_beam(&catalog, &satellite, &observer)?;
                    info!(
                        "Best beam {} ({}): θ {:.3}°, {:.2} dBi",
                        best.beam_id, best.beam_name, best.off_axis_deg, best.directivity_dbi
                    );
                    write_json(output, &best)?;
                }
            }
        }

        Command::LinkBudget {
            tx_directivity_dbi,
            distance_km,
            params,
        } => {
            let params = load_params(params.as_deref())?;
            let result = link_budget::evaluate(tx_directivity_dbi, distance_km, &params)?;
            info!("CINR {:.2} dB ({})", result.cinr_db, result.quality.label());
            write_json(output, &result)?;
        }

        Command::Downlink {
            source,
            observer,
            params,
        } => {
            let catalog = JsonCatalog::load(&source.catalog)?;
            let request = DownlinkRequest {
                observer: observer.point(),
                satellite_id: source.satellite_id,
                link_params: load_params(params.as_deref())?,
            };
            let report = evaluate_downlink(&catalog, &request)?;
            write_json(output, &report)?;
        }
    }

    Ok(())
}

/// Link parameters from an optional JSON file; missing fields keep defaults
fn load_params(path: Option<&Path>) -> Result<LinkBudgetParameters> {
    let Some(path) = path else {
        return Ok(LinkBudgetParameters::default());
    };
    info!("Loading link parameters from {:?}", path);
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let params: LinkBudgetParameters = serde_json::from_reader(io::BufReader::new(file))?;
    params.validate()?;
    Ok(params)
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            info!("Writing output to {:?}", path);
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
