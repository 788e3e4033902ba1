//! # Plume Rise
//!
//! `plumerise` computes the vertical distribution of wildfire smoke
//! emissions, hour by hour, for consumption by dispersion models.
//!
//! Two models are provided:
//!
//! - [`sev::SevPlumeRise`] derives plume top directly from hourly
//!   meteorological soundings and fire radiative power.
//! - [`feps::FepsPlumeRise`] drives the external FEPS executables and
//!   resolves their plume bottom/top output.
//!
//! Both hand each hour's plume bounds to a [`DistributionMode`] to
//! produce a [`DistributionRecord`].

pub mod distribution;
mod error;
pub mod feps;
mod math;
pub mod met;
pub mod sev;

pub use crate::{
    distribution::{DistributionMode, DistributionRecord, VerticalProfile},
    error::PlumeRiseError,
    feps::{FepsConfig, FepsOutput, FepsPlumeRise, PlumeTopBehavior},
    met::{MetProfile, MetSounding, SurfaceValue},
    sev::{SevConfig, SevPlumeRise},
};
pub use chrono;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Per-hour vertical distribution of emissions, in hour order.
pub type PlumeRise = BTreeMap<NaiveDateTime, DistributionRecord>;
