//! SEV plume rise.
//!
//! Plume top is computed directly from the meteorology and the fire's
//! radiative power using the semi-empirical formula of Sofiev,
//! Ermakova & Vankevich (2012):
//!
//! ```text
//! H_p = α H_abl + β (P_f / P_f0)^γ exp(-δ N_ft² / N_0²)
//! ```
//!
//! # References
//!
//! 1. [Sofiev et al. 2012](https://doi.org/10.5194/acp-12-1995-2012)

use crate::{
    distribution::DistributionMode,
    error::PlumeRiseError,
    met::{HourlyMet, MetProfile},
    PlumeRise,
};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// FRP (W) per unit of fire area, used when FRP isn't known.
///
/// Approximated by averaging the maximum values of the GMES fire
/// radiative power product.
pub const FRP_PER_AREA: f64 = 4180.8;

/// SEV model constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SevConfig {
    /// Fraction of the boundary layer passed freely (< 1).
    pub alpha: f64,
    /// Contribution of fire intensity (m, > 0).
    pub beta: f64,
    /// Reference fire power, `P_f0` (W).
    pub ref_power: f64,
    /// Power law dependence on FRP (< 0.5).
    pub gamma: f64,
    /// Dependence on free troposphere stability (>= 0).
    pub delta: f64,
    /// Reference Brunt–Väisälä frequency squared, `N_0²` (s⁻²).
    pub ref_n: f64,
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    pub plume_bottom_over_top: f64,
    pub distribution: DistributionMode,
}

impl Default for SevConfig {
    fn default() -> Self {
        Self {
            alpha: 0.24,
            beta: 170.0,
            ref_power: 1e6,
            gamma: 0.35,
            delta: 0.6,
            ref_n: 2.5e-4,
            gravity: 9.8,
            plume_bottom_over_top: 0.5,
            distribution: DistributionMode::Percentiles,
        }
    }
}

/// Returns the FRP (W) to use for a fire of `fire_area`.
///
/// An explicit `frp` takes precedence, clamped to be non-negative.
pub fn resolve_frp(fire_area: f64, frp: Option<f64>) -> f64 {
    match frp {
        Some(frp) => frp.max(0.0),
        None => FRP_PER_AREA * fire_area,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SevPlumeRise {
    config: SevConfig,
}

impl SevPlumeRise {
    pub fn new(config: SevConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SevConfig {
        &self.config
    }

    /// Computes plume rise for every hour in `met` with a complete
    /// sounding.
    ///
    /// Hours missing heights, relative humidity, or potential
    /// temperature are skipped and absent from the result.
    pub fn compute(
        &self,
        met: &MetProfile,
        fire_area: f64,
        smolder_fraction: f64,
        frp: Option<f64>,
    ) -> Result<PlumeRise, PlumeRiseError> {
        info!("running SEV plume rise; hours: {}", met.len());
        let frp = resolve_frp(fire_area, frp);

        let mut plume_rise = PlumeRise::new();
        for (&timestamp, sounding) in met {
            let Some(hourly) = HourlyMet::from_sounding(sounding, frp) else {
                warn!("skipping {timestamp}; incomplete sounding");
                continue;
            };
            let plume_top = self.smoke_height(timestamp, &hourly)?;
            let plume_bottom = plume_top * self.config.plume_bottom_over_top;
            let record =
                self.config
                    .distribution
                    .build(smolder_fraction, Some(plume_top), Some(plume_bottom));
            plume_rise.insert(timestamp, record);
        }
        Ok(plume_rise)
    }

    /// Returns the height (m) of the top of the smoke plume.
    pub fn smoke_height(
        &self,
        timestamp: NaiveDateTime,
        hourly: &HourlyMet,
    ) -> Result<f64, PlumeRiseError> {
        let SevConfig {
            alpha,
            beta,
            ref_power,
            gamma,
            delta,
            ref_n,
            ..
        } = self.config;

        let height_abl = hourly.height_abl.ok_or(PlumeRiseError::Sounding {
            timestamp,
            reason: "no boundary layer height (PBLH or HPBL)",
        })?;
        let nft = self.brunt_vaisala(timestamp, hourly)?;

        Ok(alpha * height_abl
            + beta * (hourly.frp / ref_power).powf(gamma) * (-delta * ((nft * nft) / ref_n)).exp())
    }

    /// Returns the Brunt–Väisälä frequency (s⁻¹) from the two lowest
    /// levels of the sounding.
    pub fn brunt_vaisala(
        &self,
        timestamp: NaiveDateTime,
        hourly: &HourlyMet,
    ) -> Result<f64, PlumeRiseError> {
        let (&[h0, h1, ..], &[theta0, theta1, ..]) = (
            hourly.height.as_slice(),
            hourly.potential_temperature.as_slice(),
        ) else {
            return Err(PlumeRiseError::Sounding {
                timestamp,
                reason: "fewer than two height/potential temperature levels",
            });
        };
        if h1 <= h0 {
            return Err(PlumeRiseError::Sounding {
                timestamp,
                reason: "first two levels do not increase in height",
            });
        }
        if theta0 + theta1 <= 0.0 {
            return Err(PlumeRiseError::Sounding {
                timestamp,
                reason: "non-positive potential temperature",
            });
        }

        let gravity = self.config.gravity;
        Ok(((gravity * 2.0) / (theta0 + theta1) * (theta1 - theta0).abs() / (h1 - h0)).sqrt())
    }
}
