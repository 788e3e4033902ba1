//! Vertical distribution of one hour's emissions between plume bottom
//! and plume top.

use crate::{
    error::PlumeRiseError,
    math::{lerp_percent, linspace},
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Number of equal-share layers in [`VerticalProfile::Layers`].
pub const LAYERS: usize = 20;

/// Share of the hour's emissions placed in each layer.
pub const LAYER_FRACTION: f64 = 0.05;

/// Distance, in percentile points, between entries of
/// [`VerticalProfile::Percentiles`].
pub const PERCENTILE_STEP: usize = 5;

/// Number of entries in [`VerticalProfile::Percentiles`] (0 through
/// 100 inclusive).
pub const PERCENTILES: usize = 100 / PERCENTILE_STEP + 1;

/// Shape of the per-hour vertical profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DistributionMode {
    /// 21 evenly spaced layer boundaries with 20 equal emission
    /// fractions.
    #[default]
    Layers,
    /// Heights at percentiles 0, 5, ..., 100 of the plume depth.
    Percentiles,
}

impl DistributionMode {
    /// Returns the distribution record for one hour.
    ///
    /// When either bound is unknown the record carries only the
    /// smoldering fraction.
    pub fn build(
        self,
        smolder_fraction: f64,
        top: Option<f64>,
        bottom: Option<f64>,
    ) -> DistributionRecord {
        let profile = match (top, bottom) {
            (Some(top), Some(bottom)) => Some(match self {
                Self::Layers => VerticalProfile::Layers {
                    heights: linspace(bottom, top, LAYERS + 1).collect(),
                    emission_fractions: vec![LAYER_FRACTION; LAYERS],
                },
                Self::Percentiles => {
                    let mut heights = [0.0; PERCENTILES];
                    for (idx, height) in heights.iter_mut().enumerate() {
                        #[allow(clippy::cast_precision_loss)]
                        let pct = (idx * PERCENTILE_STEP) as f64;
                        *height = lerp_percent(bottom, top, pct);
                    }
                    heights[0] = bottom;
                    heights[PERCENTILES - 1] = top;
                    VerticalProfile::Percentiles(heights)
                }
            }),
            _ => None,
        };

        DistributionRecord {
            smolder_fraction,
            profile,
        }
    }
}

impl FromStr for DistributionMode {
    type Err = PlumeRiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "layers" => Ok(Self::Layers),
            "percentiles" => Ok(Self::Percentiles),
            _ => Err(PlumeRiseError::UnknownDistribution(s.to_string())),
        }
    }
}

impl TryFrom<String> for DistributionMode {
    type Error = PlumeRiseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layers => f.write_str("layers"),
            Self::Percentiles => f.write_str("percentiles"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerticalProfile {
    Layers {
        /// Layer boundaries from plume bottom to plume top (meters).
        heights: Vec<f64>,
        /// Fraction of emissions released in each layer.
        emission_fractions: Vec<f64>,
    },
    /// Height (meters) at each percentile step of the plume.
    Percentiles([f64; PERCENTILES]),
}

/// Plume rise for a single hour.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRecord {
    pub smolder_fraction: f64,

    /// `None` when plume bottom or top was unknown.
    pub profile: Option<VerticalProfile>,
}

impl DistributionRecord {
    /// Layer boundaries, if this is a layer profile.
    pub fn heights(&self) -> Option<&[f64]> {
        match &self.profile {
            Some(VerticalProfile::Layers { heights, .. }) => Some(heights),
            _ => None,
        }
    }

    /// Height at percentile `pct`, if this is a percentile profile and
    /// `pct` is a multiple of [`PERCENTILE_STEP`] no greater than 100.
    pub fn percentile(&self, pct: usize) -> Option<f64> {
        match &self.profile {
            Some(VerticalProfile::Percentiles(heights)) if pct % PERCENTILE_STEP == 0 => {
                heights.get(pct / PERCENTILE_STEP).copied()
            }
            _ => None,
        }
    }
}

impl Serialize for DistributionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = match &self.profile {
            None => 1,
            Some(VerticalProfile::Layers { .. }) => 3,
            Some(VerticalProfile::Percentiles(_)) => 1 + PERCENTILES,
        };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("smolder_fraction", &self.smolder_fraction)?;
        match &self.profile {
            None => {}
            Some(VerticalProfile::Layers {
                heights,
                emission_fractions,
            }) => {
                map.serialize_entry("heights", heights)?;
                map.serialize_entry("emission_fractions", emission_fractions)?;
            }
            Some(VerticalProfile::Percentiles(heights)) => {
                for (idx, height) in heights.iter().enumerate() {
                    let key = format!("percentile_{:03}", idx * PERCENTILE_STEP);
                    map.serialize_entry(&key, height)?;
                }
            }
        }
        map.end()
    }
}
