//! Spot-Beam Selector
//!
//! Picks the serving beam for a ground observer and evaluates the downlink.
//!
//! # Selection Model (two-phase)
//!
//! ```text
//! coarse:  b* = argmin_b haversine(observer, center_b)
//! refine:  θ  = off-axis angle at the satellite between center_b* and observer
//!          D  = D_peak(antenna_b*) + G_rel(θ)
//! ```
//!
//! Only the coarse winner is refined. The downlink pipeline then feeds `D`
//! and the slant range into the link budget.

use antenna_pattern::PatternError;
use link_budget::{LinkBudgetError, LinkBudgetParameters, LinkBudgetResult};
use orbital_geometry::GeodeticPoint;
use serde::{Deserialize, Serialize};
use spot_beam::FootprintError;
use thiserror::Error;

pub mod loader;
pub mod selector;

pub use loader::{BeamCatalog, JsonCatalog};
pub use selector::{evaluate_downlink, footprints, rank_beams, select_best_beam};

/// Beams evaluated by `rank_beams` when no shortlist size is given
pub const DEFAULT_SHORTLIST: usize = 5;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No {kind} record for {id}")]
    ExternalDataUnavailable { kind: &'static str, id: String },
    #[error("Invalid observer location ({latitude}, {longitude})")]
    InvalidObserver { latitude: f64, longitude: f64 },
    #[error("No beams to select from")]
    NoBeams,
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
    #[error("Footprint error: {0}")]
    Footprint(#[from] FootprintError),
    #[error("Link budget error: {0}")]
    LinkBudget(#[from] LinkBudgetError),
}

impl SelectorError {
    pub fn unavailable(kind: &'static str, id: impl ToString) -> Self {
        SelectorError::ExternalDataUnavailable {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;

/// Spot beam aimed at a ground point, served by one antenna
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub center: GeodeticPoint,
    pub antenna_id: u32,
}

/// Selected beam with the observer's geometry and directivity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestBeam {
    pub beam_id: u32,
    pub beam_name: String,
    pub antenna_id: u32,
    pub center: GeodeticPoint,
    /// Great-circle distance observer → beam center
    pub surface_distance_km: f64,
    pub off_axis_deg: f64,
    /// Satellite → observer
    pub slant_range_km: f64,
    /// Pattern gain at the off-axis angle (dB, relative to peak)
    pub relative_gain_db: f64,
    /// Absolute directivity towards the observer
    pub directivity_dbi: f64,
}

/// Downlink evaluation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlinkRequest {
    pub observer: GeodeticPoint,
    /// Lowest-id satellite in the catalog when omitted
    #[serde(default)]
    pub satellite_id: Option<u32>,
    #[serde(default)]
    pub link_params: LinkBudgetParameters,
}

/// Downlink evaluation output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlinkReport {
    pub satellite_id: u32,
    pub observer: GeodeticPoint,
    pub best_beam: BestBeam,
    pub link_params: LinkBudgetParameters,
    pub link_budget: LinkBudgetResult,
    pub quality_label: String,
    pub generated_at: String,
}
