//! FEPS model inputs and the files they are written to.

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Burn phase fractions keyed by hour.
pub type TimeProfile = BTreeMap<NaiveDateTime, HourlyFractions>;

/// Fraction of area and of each combustion phase's consumption
/// attributed to one hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyFractions {
    pub area_fraction: f64,
    pub flaming: f64,
    pub smoldering: f64,
    pub residual: f64,
}

/// Total consumption by combustion phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    pub flaming: f64,
    pub smoldering: f64,
    pub residual: f64,
    #[serde(default)]
    pub duff: Option<f64>,
}

/// Fire location and diurnal weather parameters.
///
/// Anything left `None` is filled from [`WeatherParameters::DEFAULT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireLocationInfo {
    /// Fire area (acres).
    pub area: f64,
    pub min_wind: Option<f64>,
    pub max_wind: Option<f64>,
    pub min_wind_aloft: Option<f64>,
    pub max_wind_aloft: Option<f64>,
    pub min_humid: Option<f64>,
    pub max_humid: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    #[serde(default, deserialize_with = "whole_number")]
    pub min_temp_hour: Option<u32>,
    #[serde(default, deserialize_with = "whole_number")]
    pub max_temp_hour: Option<u32>,
    #[serde(default, deserialize_with = "whole_number")]
    pub snow_month: Option<u32>,
    #[serde(default, deserialize_with = "whole_number")]
    pub rain_days: Option<u32>,
    #[serde(default, deserialize_with = "whole_number")]
    pub sunrise_hour: Option<u32>,
    #[serde(default, deserialize_with = "whole_number")]
    pub sunset_hour: Option<u32>,
    pub moisture_duff: Option<f64>,
}

/// Fully specified weather parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherParameters {
    /// Wind at flame height.
    pub min_wind: f64,
    pub max_wind: f64,
    /// Transport wind aloft.
    pub min_wind_aloft: f64,
    pub max_wind_aloft: f64,
    /// Relative humidity (%).
    pub min_humid: f64,
    pub max_humid: f64,
    /// Temperature (C).
    pub min_temp: f64,
    pub max_temp: f64,
    /// Hour of minimum temperature (predawn).
    pub min_temp_hour: u32,
    /// Hour of maximum temperature (midday).
    pub max_temp_hour: u32,
    pub snow_month: u32,
    pub rain_days: u32,
    pub sunrise_hour: u32,
    pub sunset_hour: u32,
    pub moisture_duff: f64,
}

impl WeatherParameters {
    pub const DEFAULT: Self = Self {
        min_wind: 6.0,
        max_wind: 6.0,
        min_wind_aloft: 6.0,
        max_wind_aloft: 6.0,
        min_humid: 40.0,
        max_humid: 80.0,
        min_temp: 13.0,
        max_temp: 30.0,
        min_temp_hour: 4,
        max_temp_hour: 14,
        snow_month: 5,
        rain_days: 8,
        sunrise_hour: 6,
        sunset_hour: 18,
        // Observed listings carry either 150.0 or 40.0.
        moisture_duff: 100.0,
    };
}

/// Reads an hour, month or day count written either as an integer or as
/// a float, truncating any fractional part.
fn whole_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
    match Option::<f64>::deserialize(de)? {
        None => Ok(None),
        Some(v) if v.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&v) => Ok(Some(v as u32)),
        Some(v) => Err(de::Error::custom(format!("expected a non-negative whole number, got {v}"))),
    }
}

impl FireLocationInfo {
    pub fn new(area: f64) -> Self {
        Self {
            area,
            ..Self::default()
        }
    }

    /// Fills every unset field from [`WeatherParameters::DEFAULT`] and
    /// returns the resulting parameters.
    pub fn fill_defaults(&mut self) -> WeatherParameters {
        let d = WeatherParameters::DEFAULT;
        WeatherParameters {
            min_wind: *self.min_wind.get_or_insert(d.min_wind),
            max_wind: *self.max_wind.get_or_insert(d.max_wind),
            min_wind_aloft: *self.min_wind_aloft.get_or_insert(d.min_wind_aloft),
            max_wind_aloft: *self.max_wind_aloft.get_or_insert(d.max_wind_aloft),
            min_humid: *self.min_humid.get_or_insert(d.min_humid),
            max_humid: *self.max_humid.get_or_insert(d.max_humid),
            min_temp: *self.min_temp.get_or_insert(d.min_temp),
            max_temp: *self.max_temp.get_or_insert(d.max_temp),
            min_temp_hour: *self.min_temp_hour.get_or_insert(d.min_temp_hour),
            max_temp_hour: *self.max_temp_hour.get_or_insert(d.max_temp_hour),
            snow_month: *self.snow_month.get_or_insert(d.snow_month),
            rain_days: *self.rain_days.get_or_insert(d.rain_days),
            sunrise_hour: *self.sunrise_hour.get_or_insert(d.sunrise_hour),
            sunset_hour: *self.sunset_hour.get_or_insert(d.sunset_hour),
            moisture_duff: *self.moisture_duff.get_or_insert(d.moisture_duff),
        }
    }
}

/// Writes the weather file consumed by the diurnal weather tool.
pub fn write_weather<W: Write>(mut wtr: W, weather: &WeatherParameters) -> io::Result<()> {
    writeln!(wtr, "sunsetTime={}", weather.sunset_hour)?;
    writeln!(wtr, "middayTime={}", weather.max_temp_hour)?;
    writeln!(wtr, "predawnTime={}", weather.min_temp_hour)?;
    writeln!(wtr, "minHumid={:.6}", weather.min_humid)?;
    writeln!(wtr, "maxHumid={:.6}", weather.max_humid)?;
    writeln!(wtr, "minTemp={:.6}", weather.min_temp)?;
    writeln!(wtr, "maxTemp={:.6}", weather.max_temp)?;
    writeln!(wtr, "minWindAtFlame={:.6}", weather.min_wind)?;
    writeln!(wtr, "maxWindAtFlame={:.6}", weather.max_wind)?;
    writeln!(wtr, "minWindAloft={:.6}", weather.min_wind_aloft)?;
    writeln!(wtr, "maxWindAloft={:.6}", weather.max_wind_aloft)?;
    wtr.flush()
}

/// Writes the hourly profile file consumed by the plume tool.
///
/// The `hour` column is the sequential index of each timestamp, not
/// elapsed time.
pub fn write_profile<W: Write>(mut wtr: W, profile: &TimeProfile) -> io::Result<()> {
    writeln!(wtr, "hour, area_fract, flame, smolder, residual")?;
    for (hour, fractions) in profile.values().enumerate() {
        let HourlyFractions {
            area_fraction,
            flaming,
            smoldering,
            residual,
        } = fractions;
        writeln!(
            wtr,
            "{hour}, {area_fraction:.6}, {flaming:.6}, {smoldering:.6}, {residual:.6}"
        )?;
    }
    wtr.flush()
}

/// Writes the consumption file consumed by the plume tool.
pub fn write_consumption<W: Write>(
    mut wtr: W,
    consumption: &Consumption,
    moisture_duff: f64,
) -> io::Result<()> {
    writeln!(wtr, "cons_flm={:.6}", consumption.flaming)?;
    writeln!(wtr, "cons_sts={:.6}", consumption.smoldering)?;
    writeln!(wtr, "cons_lts={:.6}", consumption.residual)?;
    writeln!(wtr, "cons_duff={:.6}", consumption.duff.unwrap_or(0.0))?;
    writeln!(wtr, "moist_duff={moisture_duff:.6}")?;
    wtr.flush()
}

/// Creates `path` and hands a buffered writer for it to `write`.
pub(crate) fn write_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(BufWriter<File>) -> io::Result<()>,
{
    write(BufWriter::new(File::create(path)?))
}
