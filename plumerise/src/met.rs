//! Hourly meteorological soundings consumed by the SEV model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Soundings keyed by hour.
pub type MetProfile = BTreeMap<NaiveDateTime, MetSounding>;

/// A single hour's sounding, as extracted from ARL met files.
///
/// Per-level fields are ordered from the surface up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetSounding {
    /// Pressure (mb).
    pub pressure: Option<Vec<f64>>,
    /// Height of each level (m).
    #[serde(rename = "HGTS")]
    pub hgts: Option<Vec<f64>>,
    /// Relative humidity (%).
    #[serde(rename = "RELH")]
    pub relh: Option<Vec<f64>>,
    /// Potential temperature (K).
    #[serde(rename = "TPOT")]
    pub tpot: Option<Vec<f64>>,
    /// Wind speed (m/s).
    #[serde(rename = "WSPD")]
    pub wspd: Option<Vec<f64>>,
    /// Wind direction (degrees).
    #[serde(rename = "WDIR")]
    pub wdir: Option<Vec<f64>>,
    /// Temperature (C).
    #[serde(rename = "TEMP")]
    pub temp: Option<Vec<f64>>,
    /// Pressure vertical velocity (mb/h).
    #[serde(rename = "WWND")]
    pub wwnd: Option<Vec<f64>>,
    /// Temperature at 2m (K).
    #[serde(rename = "TO2M")]
    pub to2m: Option<SurfaceValue>,
    /// Relative humidity at 2m (%).
    #[serde(rename = "RH2M")]
    pub rh2m: Option<SurfaceValue>,
    /// 3 hour accumulated precipitation (m).
    #[serde(rename = "TPP3")]
    pub tpp3: Option<SurfaceValue>,
    /// 6 hour accumulated precipitation (m).
    #[serde(rename = "TPP6")]
    pub tpp6: Option<SurfaceValue>,
    /// Boundary layer height (m), one spelling.
    #[serde(rename = "HPBL")]
    pub hpbl: Option<f64>,
    /// Boundary layer height (m), the other spelling.
    #[serde(rename = "PBLH")]
    pub pblh: Option<f64>,
}

/// A surface field, reported either as a single value or as a short
/// series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurfaceValue {
    Scalar(f64),
    Series(Vec<f64>),
}

/// Physical quantities for one hour of an SEV run.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyMet {
    pub pressure: Option<Vec<f64>>,
    pub height: Vec<f64>,
    pub relative_humidity: Vec<f64>,
    pub potential_temperature: Vec<f64>,
    pub wind_speed: Option<Vec<f64>>,
    pub wind_direction: Option<Vec<f64>>,
    pub temperature: Option<Vec<f64>>,
    pub press_vertical_v: Option<Vec<f64>>,
    pub temp_at_2m: Option<SurfaceValue>,
    pub rh_at_2m: Option<SurfaceValue>,
    pub accum_precip_3hr: Option<SurfaceValue>,
    pub accum_precip_6hr: Option<SurfaceValue>,
    pub height_abl: Option<f64>,
    /// Fire radiative power (W).
    pub frp: f64,
}

impl HourlyMet {
    /// Returns `None` if the sounding lacks heights, humidity or
    /// potential temperature.
    pub fn from_sounding(sounding: &MetSounding, frp: f64) -> Option<Self> {
        fn levels(field: &Option<Vec<f64>>) -> Option<Vec<f64>> {
            field.as_ref().filter(|v| !v.is_empty()).cloned()
        }

        Some(Self {
            pressure: sounding.pressure.clone(),
            height: levels(&sounding.hgts)?,
            relative_humidity: levels(&sounding.relh)?,
            potential_temperature: levels(&sounding.tpot)?,
            wind_speed: sounding.wspd.clone(),
            wind_direction: sounding.wdir.clone(),
            temperature: sounding.temp.clone(),
            press_vertical_v: sounding.wwnd.clone(),
            temp_at_2m: sounding.to2m.clone(),
            rh_at_2m: sounding.rh2m.clone(),
            accum_precip_3hr: sounding.tpp3.clone(),
            accum_precip_6hr: sounding.tpp6.clone(),
            height_abl: sounding.pblh.or(sounding.hpbl),
            frp,
        })
    }
}
