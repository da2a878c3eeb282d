//! Antenna Pattern Library
//!
//! Radiation patterns for GEO spot-beam reflectors:
//! - Physical-optics forward model (TE11 feed × circular aperture)
//! - Measured/tabulated patterns with gain-at-angle and angle-at-gain lookup
//! - Aperture sizing from a half-power beamwidth
//!
//! # Pattern Model
//!
//! ```text
//! E_feed(θ)  = J₁(x)/x,          x = (2π/1.706)·sin θ
//! P_ap(θ)    = (2·J₁(u)/u)²,      u = k·(D/2)·sin θ
//! G_rel(θ)   = 10·log10(E_feed² · P_ap / max)   (floored at −90 dB)
//! ```
//!
//! Patterns are relative (0 dB peak). Absolute directivity comes from the
//! owning [`Antenna`] record's peak directivity.

use thiserror::Error;

pub mod aperture;
pub mod bessel;
pub mod model;
pub mod pattern;

pub use aperture::{
    diameter_from_directivity, directivity_from_beamwidth, size_from_beamwidth, ApertureSizing,
};
pub use model::{Aperture, RadiationModel};
pub use pattern::{Antenna, AntennaPattern, PatternSamples};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Pattern has {usable} usable samples, need at least 2")]
    InsufficientData { usable: usize },
    #[error("Pattern length mismatch: {theta} angles, {gain} gains")]
    LengthMismatch { theta: usize, gain: usize },
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, PatternError>;

/// Reject non-finite and non-positive physical inputs
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PatternError::InvalidParameter { name, value })
    }
}
