//! Downlink Link Budget Calculator
//!
//! Carrier-to-interference-plus-noise ratio of a satellite downlink.
//! Accounts for:
//! - Antenna efficiency on both ends
//! - Free space path loss
//! - Lumped downlink losses (feeder, pointing, rain, atmosphere)
//! - Receiver figure of merit (G/T)
//! - Co-channel interference (C/I)
//!
//! ```text
//! C/N  = EIRP − FSL − L + G/T − k − 10·log10(B)
//! CINR = 10·log10(1 / (1/C/N + 1/C/I))     (linear ratios inside)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Boltzmann constant in dBW/Hz/K
pub const BOLTZMANN_DB: f64 = -228.6;

/// FSL constant for distance in km and frequency in MHz
pub const FSL_CONSTANT_DB: f64 = 32.44;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkBudgetError {
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, LinkBudgetError>;

/// Downlink configuration (everything except the geometry-dependent inputs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkBudgetParameters {
    pub frequency_ghz: f64,
    /// Ground-station receive directivity (dBi)
    pub rx_directivity_dbi: f64,
    /// Aperture efficiency applied to both antennas (linear, 0-1)
    pub efficiency: f64,
    /// Satellite transmit power (dBW)
    pub tx_power_dbw: f64,
    /// Ground-station system noise temperature (K)
    pub system_noise_temp_k: f64,
    pub bandwidth_hz: f64,
    /// Lumped downlink losses (dB)
    pub losses_db: f64,
    /// Carrier-to-interference ratio (dB)
    pub c_to_i_db: f64,
}

impl Default for LinkBudgetParameters {
    fn default() -> Self {
        // Ka-band downlink, 36 MHz transponder
        Self {
            frequency_ghz: 20.0,
            rx_directivity_dbi: 45.0,
            efficiency: 0.65,
            tx_power_dbw: 17.0,
            system_noise_temp_k: 100.0,
            bandwidth_hz: 36.0e6,
            losses_db: 3.0,
            c_to_i_db: 20.0,
        }
    }
}

impl LinkBudgetParameters {
    /// Reject inputs that would make the dB chain undefined
    pub fn validate(&self) -> Result<()> {
        require_positive("frequency_ghz", self.frequency_ghz)?;
        require_positive("efficiency", self.efficiency)?;
        require_positive("system_noise_temp_k", self.system_noise_temp_k)?;
        require_positive("bandwidth_hz", self.bandwidth_hz)?;
        require_finite("rx_directivity_dbi", self.rx_directivity_dbi)?;
        require_finite("tx_power_dbw", self.tx_power_dbw)?;
        require_finite("losses_db", self.losses_db)?;
        require_finite("c_to_i_db", self.c_to_i_db)?;
        Ok(())
    }
}

/// Link quality bands on CINR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkQuality {
    /// CINR < 0 dB
    VeryPoor,
    /// 0 ≤ CINR < 6 dB
    Poor,
    /// 6 ≤ CINR < 10 dB
    Marginal,
    /// CINR ≥ 10 dB
    Good,
}

impl LinkQuality {
    pub fn from_cinr(cinr_db: f64) -> Self {
        if cinr_db < 0.0 {
            LinkQuality::VeryPoor
        } else if cinr_db < 6.0 {
            LinkQuality::Poor
        } else if cinr_db < 10.0 {
            LinkQuality::Marginal
        } else {
            LinkQuality::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkQuality::VeryPoor => "Very poor (noise/interference exceeds signal)",
            LinkQuality::Poor => "Poor (needs very robust modulation)",
            LinkQuality::Marginal => "Marginal (sufficient for standard modulation)",
            LinkQuality::Good => "Good",
        }
    }
}

/// Detailed link budget breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBudgetResult {
    pub tx_gain_dbi: f64,
    pub rx_gain_dbi: f64,
    pub eirp_dbw: f64,
    pub fsl_db: f64,
    pub g_over_t_dbk: f64,
    pub c_over_n_db: f64,
    pub c_over_i_db: f64,
    pub cinr_db: f64,
    pub quality: LinkQuality,
}

/// Antenna gain from directivity and aperture efficiency
pub fn antenna_gain_dbi(directivity_dbi: f64, efficiency: f64) -> Result<f64> {
    require_finite("directivity_dbi", directivity_dbi)?;
    require_positive("efficiency", efficiency)?;
    Ok(directivity_dbi + 10.0 * efficiency.log10())
}

/// Free space path loss in dB
pub fn free_space_loss_db(distance_km: f64, frequency_ghz: f64) -> Result<f64> {
    require_positive("distance_km", distance_km)?;
    require_positive("frequency_ghz", frequency_ghz)?;
    let frequency_mhz = frequency_ghz * 1000.0;
    Ok(FSL_CONSTANT_DB + 20.0 * distance_km.log10() + 20.0 * frequency_mhz.log10())
}

/// Receiver figure of merit in dB/K
pub fn g_over_t_dbk(rx_gain_dbi: f64, system_noise_temp_k: f64) -> Result<f64> {
    require_finite("rx_gain_dbi", rx_gain_dbi)?;
    require_positive("system_noise_temp_k", system_noise_temp_k)?;
    Ok(rx_gain_dbi - 10.0 * system_noise_temp_k.log10())
}

/// Downlink carrier-to-noise ratio in dB
pub fn carrier_to_noise_db(
    eirp_dbw: f64,
    fsl_db: f64,
    losses_db: f64,
    g_over_t_dbk: f64,
    bandwidth_hz: f64,
) -> Result<f64> {
    require_finite("eirp_dbw", eirp_dbw)?;
    require_finite("fsl_db", fsl_db)?;
    require_finite("losses_db", losses_db)?;
    require_finite("g_over_t_dbk", g_over_t_dbk)?;
    require_positive("bandwidth_hz", bandwidth_hz)?;
    Ok(eirp_dbw - fsl_db - losses_db + g_over_t_dbk - BOLTZMANN_DB - 10.0 * bandwidth_hz.log10())
}

/// Combine C/N and C/I (both dB) into CINR (dB)
pub fn combine_cinr(c_over_n_db: f64, c_over_i_db: f64) -> f64 {
    let cn = 10f64.powf(c_over_n_db / 10.0);
    let ci = 10f64.powf(c_over_i_db / 10.0);
    10.0 * (1.0 / (1.0 / cn + 1.0 / ci)).log10()
}

/// Run the full downlink chain for a satellite antenna with `tx_directivity_dbi`
/// towards a ground station `distance_km` away
pub fn evaluate(
    tx_directivity_dbi: f64,
    distance_km: f64,
    params: &LinkBudgetParameters,
) -> Result<LinkBudgetResult> {
    require_finite("tx_directivity_dbi", tx_directivity_dbi)?;
    require_positive("distance_km", distance_km)?;
    params.validate()?;

    let tx_gain_dbi = antenna_gain_dbi(tx_directivity_dbi, params.efficiency)?;
    let rx_gain_dbi = antenna_gain_dbi(params.rx_directivity_dbi, params.efficiency)?;
    let fsl_db = free_space_loss_db(distance_km, params.frequency_ghz)?;
    let eirp_dbw = params.tx_power_dbw + tx_gain_dbi;
    let g_over_t = g_over_t_dbk(rx_gain_dbi, params.system_noise_temp_k)?;
    let c_over_n_db = carrier_to_noise_db(eirp_dbw, fsl_db, params.losses_db, g_over_t, params.bandwidth_hz)?;
    let cinr_db = combine_cinr(c_over_n_db, params.c_to_i_db);
    let quality = LinkQuality::from_cinr(cinr_db);

    debug!(
        "Link budget: D_tx={:.2} dBi, d={:.1} km, EIRP={:.2} dBW, FSL={:.2} dB, C/N={:.2} dB, CINR={:.2} dB ({:?})",
        tx_directivity_dbi, distance_km, eirp_dbw, fsl_db, c_over_n_db, cinr_db, quality
    );

    Ok(LinkBudgetResult {
        tx_gain_dbi,
        rx_gain_dbi,
        eirp_dbw,
        fsl_db,
        g_over_t_dbk: g_over_t,
        c_over_n_db,
        c_over_i_db: params.c_to_i_db,
        cinr_db,
        quality,
    })
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LinkBudgetError::InvalidParameter { name, value })
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LinkBudgetError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_space_loss() {
        // GEO-ish range at Ka band
        let fsl = free_space_loss_db(40000.0, 20.0).unwrap();
        assert!((fsl - 210.50).abs() < 0.01, "FSL: {}", fsl);

        // 1 km at 1 MHz is the bare constant
        assert!((free_space_loss_db(1.0, 0.001).unwrap() - FSL_CONSTANT_DB).abs() < 1e-9);
    }

    #[test]
    fn test_carrier_to_noise_sanity() {
        // EIRP 47, FSL 206, L 3, G/T 15, 36 MHz
        let cn = carrier_to_noise_db(47.0, 206.0, 3.0, 15.0, 36.0e6).unwrap();
        assert!((cn - 6.037).abs() < 0.01, "C/N: {}", cn);

        let cinr = combine_cinr(cn, 20.0);
        assert!(cinr < cn && cinr < 20.0);
        assert!((cinr - 5.867).abs() < 0.01, "CINR: {}", cinr);
    }

    #[test]
    fn test_combine_cinr_limits() {
        // Interference negligible: CINR → C/N
        assert!((combine_cinr(12.0, 300.0) - 12.0).abs() < 1e-9);
        // Noise negligible: CINR → C/I
        assert!((combine_cinr(300.0, 18.0) - 18.0).abs() < 1e-9);
        // Equal contributions: 3 dB below either
        assert!((combine_cinr(10.0, 10.0) - (10.0 - 10.0 * 2f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn test_quality_bands() {
        assert_eq!(LinkQuality::from_cinr(-0.1), LinkQuality::VeryPoor);
        assert_eq!(LinkQuality::from_cinr(0.0), LinkQuality::Poor);
        assert_eq!(LinkQuality::from_cinr(5.99), LinkQuality::Poor);
        assert_eq!(LinkQuality::from_cinr(6.0), LinkQuality::Marginal);
        assert_eq!(LinkQuality::from_cinr(9.99), LinkQuality::Marginal);
        assert_eq!(LinkQuality::from_cinr(10.0), LinkQuality::Good);
        assert_eq!(LinkQuality::Good.label(), "Good");
    }

    #[test]
    fn test_evaluate_chain() {
        let params = LinkBudgetParameters::default();
        let result = evaluate(52.0, 38195.0, &params).unwrap();

        let eff_db = 10.0 * 0.65f64.log10();
        assert!((result.tx_gain_dbi - (52.0 + eff_db)).abs() < 1e-9);
        assert!((result.rx_gain_dbi - (45.0 + eff_db)).abs() < 1e-9);
        assert!((result.eirp_dbw - (17.0 + result.tx_gain_dbi)).abs() < 1e-9);
        assert!((result.g_over_t_dbk - (result.rx_gain_dbi - 20.0)).abs() < 1e-9);
        assert_eq!(result.c_over_i_db, 20.0);
        assert!(result.cinr_db < result.c_over_n_db.min(result.c_over_i_db));
        assert_eq!(result.quality, LinkQuality::from_cinr(result.cinr_db));
    }

    #[test]
    fn test_evaluate_rejects_bad_inputs() {
        let params = LinkBudgetParameters::default();
        assert_eq!(
            evaluate(50.0, 0.0, &params),
            Err(LinkBudgetError::InvalidParameter { name: "distance_km", value: 0.0 })
        );
        assert!(evaluate(f64::NAN, 38000.0, &params).is_err());

        let bad_bw = LinkBudgetParameters { bandwidth_hz: -1.0, ..Default::default() };
        assert!(matches!(
            evaluate(50.0, 38000.0, &bad_bw),
            Err(LinkBudgetError::InvalidParameter { name: "bandwidth_hz", .. })
        ));

        let bad_temp = LinkBudgetParameters { system_noise_temp_k: 0.0, ..Default::default() };
        assert!(bad_temp.validate().is_err());

        let bad_ci = LinkBudgetParameters { c_to_i_db: f64::INFINITY, ..Default::default() };
        assert!(bad_ci.validate().is_err());
    }

    #[test]
    fn test_chain_steps_reject_degenerate_inputs() {
        assert_eq!(
            free_space_loss_db(0.0, 20.0),
            Err(LinkBudgetError::InvalidParameter { name: "distance_km", value: 0.0 })
        );
        assert!(matches!(
            free_space_loss_db(38000.0, -20.0),
            Err(LinkBudgetError::InvalidParameter { name: "frequency_ghz", .. })
        ));
        assert_eq!(
            antenna_gain_dbi(50.0, 0.0),
            Err(LinkBudgetError::InvalidParameter { name: "efficiency", value: 0.0 })
        );
        assert!(matches!(
            g_over_t_dbk(40.0, -5.0),
            Err(LinkBudgetError::InvalidParameter { name: "system_noise_temp_k", .. })
        ));
        assert!(matches!(
            carrier_to_noise_db(47.0, 206.0, 3.0, 15.0, 0.0),
            Err(LinkBudgetError::InvalidParameter { name: "bandwidth_hz", .. })
        ));
        assert!(carrier_to_noise_db(47.0, f64::INFINITY, 3.0, 15.0, 36.0e6).is_err());
        assert!(antenna_gain_dbi(f64::NAN, 0.65).is_err());
    }

    #[test]
    fn test_parameters_partial_override() {
        let params: LinkBudgetParameters =
            serde_json::from_str(r#"{"frequency_ghz": 19.7, "losses_db": 5.0}"#).unwrap();
        assert_eq!(params.frequency_ghz, 19.7);
        assert_eq!(params.losses_db, 5.0);
        assert_eq!(params.bandwidth_hz, 36.0e6);
        assert_eq!(params.c_to_i_db, 20.0);
    }
}
