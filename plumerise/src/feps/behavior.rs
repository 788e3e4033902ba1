use crate::error::PlumeRiseError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How to model plume top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PlumeTopBehavior {
    /// Use the Briggs equation for plume top.
    Briggs,
    /// Use the simplistic FEPS equation for plume top (2 * plume bottom).
    Feps,
    /// Use the Briggs equation unless the result would be below the
    /// plume bottom, in which case use the FEPS equation.
    #[default]
    Auto,
}

/// Plume bounds (meters) for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlumeBounds {
    pub bottom: f64,
    pub top: f64,
}

impl PlumeTopBehavior {
    /// Returns the plume bounds to use given the plume tool's output
    /// for one hour.
    ///
    /// Hours without heat have no plume at all.
    pub fn resolve(self, raw_top: f64, bottom: f64, heat: f64) -> PlumeBounds {
        let (raw_top, bottom) = if heat == 0.0 {
            (0.0, 0.0)
        } else {
            (raw_top, bottom)
        };

        let top = match self {
            Self::Briggs => raw_top,
            Self::Feps => bottom * 2.0,
            Self::Auto if raw_top < bottom => {
                debug!("adjusting plume top {raw_top} below bottom {bottom} to FEPS value");
                bottom * 2.0
            }
            Self::Auto => raw_top,
        };

        PlumeBounds { bottom, top }
    }
}

impl FromStr for PlumeTopBehavior {
    type Err = PlumeRiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "briggs" => Ok(Self::Briggs),
            "feps" => Ok(Self::Feps),
            "auto" => Ok(Self::Auto),
            _ => Err(PlumeRiseError::UnknownBehavior(s.to_string())),
        }
    }
}

impl TryFrom<String> for PlumeTopBehavior {
    type Error = PlumeRiseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for PlumeTopBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Briggs => f.write_str("briggs"),
            Self::Feps => f.write_str("feps"),
            Self::Auto => f.write_str("auto"),
        }
    }
}
