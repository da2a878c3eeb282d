//! Gain-vs-angle pattern tables and interpolation
//!
//! A pattern is normalized once at construction: samples are sorted by angle
//! and duplicate angles dropped, so lookups never re-validate. The inverse
//! (gain to angle) table is built from the same samples sorted by gain.

use crate::{PatternError, Result};
use serde::{Deserialize, Serialize};

/// Wire form of a pattern, as stored alongside an antenna record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSamples {
    pub theta_deg: Vec<f64>,
    pub gain_db: Vec<f64>,
}

/// Normalized radiation pattern (relative gain in dB vs off-axis angle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatternSamples", into = "PatternSamples")]
pub struct AntennaPattern {
    theta_deg: Vec<f64>,
    gain_db: Vec<f64>,
    /// (gain, theta) sorted by gain with duplicate gains removed
    by_gain: Vec<(f64, f64)>,
}

impl AntennaPattern {
    /// Build from parallel angle/gain samples in any order
    pub fn new(theta_deg: Vec<f64>, gain_db: Vec<f64>) -> Result<Self> {
        if theta_deg.len() != gain_db.len() {
            return Err(PatternError::LengthMismatch {
                theta: theta_deg.len(),
                gain: gain_db.len(),
            });
        }

        let mut samples: Vec<(f64, f64)> = theta_deg
            .into_iter()
            .zip(gain_db)
            .filter(|(t, g)| t.is_finite() && g.is_finite())
            .collect();

        // Stable sort keeps the first occurrence of a repeated angle in front
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        samples.dedup_by(|next, kept| next.0 == kept.0);

        if samples.len() < 2 {
            return Err(PatternError::InsufficientData {
                usable: samples.len(),
            });
        }

        let mut by_gain: Vec<(f64, f64)> = samples.iter().map(|&(t, g)| (g, t)).collect();
        by_gain.sort_by(|a, b| a.0.total_cmp(&b.0));
        by_gain.dedup_by(|next, kept| next.0 == kept.0);

        let (theta_deg, gain_db) = samples.into_iter().unzip();

        Ok(Self {
            theta_deg,
            gain_db,
            by_gain,
        })
    }

    pub fn theta_deg(&self) -> &[f64] {
        &self.theta_deg
    }

    pub fn gain_db(&self) -> &[f64] {
        &self.gain_db
    }

    pub fn len(&self) -> usize {
        self.theta_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta_deg.is_empty()
    }

    /// Angular domain covered by the table
    pub fn domain(&self) -> (f64, f64) {
        (self.theta_deg[0], self.theta_deg[self.theta_deg.len() - 1])
    }

    /// Highest relative gain in the table
    pub fn peak_gain_db(&self) -> f64 {
        self.gain_db.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Relative gain at `theta_deg`, the query clipped to the table's domain
    pub fn gain_at(&self, theta_deg: f64) -> f64 {
        let (lo, hi) = self.domain();
        let theta = theta_deg.clamp(lo, hi);
        interpolate(&self.theta_deg, &self.gain_db, theta, |&x| x, |&y| y)
    }

    /// Off-axis angle at which the pattern reaches `gain_db`.
    ///
    /// Built from the samples ordered by gain; queries beyond the gain range
    /// extrapolate from the end segments.
    pub fn theta_at(&self, gain_db: f64) -> Result<f64> {
        if self.by_gain.len() < 2 {
            return Err(PatternError::InsufficientData {
                usable: self.by_gain.len(),
            });
        }
        Ok(interpolate(
            &self.by_gain,
            &self.by_gain,
            gain_db,
            |&(g, _)| g,
            |&(_, t)| t,
        ))
    }
}

impl TryFrom<PatternSamples> for AntennaPattern {
    type Error = PatternError;

    fn try_from(raw: PatternSamples) -> Result<Self> {
        Self::new(raw.theta_deg, raw.gain_db)
    }
}

impl From<AntennaPattern> for PatternSamples {
    fn from(pattern: AntennaPattern) -> Self {
        Self {
            theta_deg: pattern.theta_deg,
            gain_db: pattern.gain_db,
        }
    }
}

/// Piecewise-linear interpolation over strictly increasing keys (len >= 2).
/// Outside the keys the end segments are extended.
fn interpolate<X, Y>(
    xs: &[X],
    ys: &[Y],
    x: f64,
    key: impl Fn(&X) -> f64,
    value: impl Fn(&Y) -> f64,
) -> f64 {
    let n = xs.len();
    let upper = xs.partition_point(|v| key(v) <= x).clamp(1, n - 1);
    let lower = upper - 1;

    let (x0, x1) = (key(&xs[lower]), key(&xs[upper]));
    let (y0, y1) = (value(&ys[lower]), value(&ys[upper]));
    let t = (x - x0) / (x1 - x0);

    // Weighted form returns the endpoints exactly at t = 0 and t = 1
    y0 * (1.0 - t) + y1 * t
}

/// Stored antenna record: relative pattern plus its absolute peak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Antenna {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Peak directivity at boresight (dBi)
    #[serde(alias = "directivity")]
    pub peak_directivity_dbi: f64,
    pub pattern: AntennaPattern,
}

impl Antenna {
    /// Absolute directivity at an off-axis angle
    pub fn directivity_at(&self, theta_deg: f64) -> f64 {
        self.peak_directivity_dbi + self.pattern.gain_at(theta_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> AntennaPattern {
        AntennaPattern::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, -3.0, -12.0, -20.0]).unwrap()
    }

    #[test]
    fn test_construction_sorts_and_dedups() {
        let pattern = AntennaPattern::new(
            vec![2.0, 0.0, 1.0, 1.0, 3.0],
            vec![-12.0, 0.0, -3.0, -99.0, -20.0],
        )
        .unwrap();

        assert_eq!(pattern.theta_deg(), &[0.0, 1.0, 2.0, 3.0]);
        // First occurrence of the duplicate angle wins
        assert_eq!(pattern.gain_db(), &[0.0, -3.0, -12.0, -20.0]);
    }

    #[test]
    fn test_insufficient_data() {
        let err = AntennaPattern::new(vec![1.0, 1.0, 1.0], vec![0.0, -1.0, -2.0]).unwrap_err();
        assert_eq!(err, PatternError::InsufficientData { usable: 1 });

        let err = AntennaPattern::new(vec![], vec![]).unwrap_err();
        assert_eq!(err, PatternError::InsufficientData { usable: 0 });

        let err = AntennaPattern::new(vec![0.0, f64::NAN], vec![0.0, -1.0]).unwrap_err();
        assert_eq!(err, PatternError::InsufficientData { usable: 1 });
    }

    #[test]
    fn test_length_mismatch() {
        let err = AntennaPattern::new(vec![0.0, 1.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, PatternError::LengthMismatch { theta: 2, gain: 1 }));
    }

    #[test]
    fn test_gain_at_interpolates() {
        let pattern = triangle();
        assert_eq!(pattern.gain_at(0.0), 0.0);
        assert!((pattern.gain_at(0.5) + 1.5).abs() < 1e-12);
        assert!((pattern.gain_at(1.5) + 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_gain_at_clips_to_domain() {
        let pattern = triangle();
        assert_eq!(pattern.gain_at(-5.0), 0.0);
        assert_eq!(pattern.gain_at(3.0), -20.0);
        assert_eq!(pattern.gain_at(45.0), -20.0);
    }

    #[test]
    fn test_theta_at_inverse() {
        let pattern = triangle();
        assert!((pattern.theta_at(-3.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((pattern.theta_at(-1.0).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((pattern.theta_at(-16.0).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_theta_at_extrapolates() {
        let pattern = triangle();
        // Beyond the weakest sample: extend the (−20, 3) ← (−12, 2) segment
        assert!((pattern.theta_at(-28.0).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_theta_at_flat_pattern() {
        let flat = AntennaPattern::new(vec![0.0, 1.0, 2.0], vec![-1.0, -1.0, -1.0]).unwrap();
        assert_eq!(flat.gain_at(1.5), -1.0);
        assert_eq!(
            flat.theta_at(-1.0).unwrap_err(),
            PatternError::InsufficientData { usable: 1 }
        );
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let json = r#"{"theta_deg": [1.0, 0.0], "gain_db": [-3.0, 0.0]}"#;
        let pattern: AntennaPattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.theta_deg(), &[0.0, 1.0]);

        let bad = r#"{"theta_deg": [1.0], "gain_db": [-3.0]}"#;
        assert!(serde_json::from_str::<AntennaPattern>(bad).is_err());
    }

    #[test]
    fn test_antenna_directivity_at() {
        let antenna = Antenna {
            id: 1,
            name: "Ka-1".to_string(),
            peak_directivity_dbi: 52.5,
            pattern: triangle(),
        };
        assert_eq!(antenna.directivity_at(0.0), 52.5);
        assert!((antenna.directivity_at(1.0) - 49.5).abs() < 1e-12);
    }
}
