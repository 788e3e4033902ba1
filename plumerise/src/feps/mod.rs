//! FEPS plume rise.
//!
//! Plume bottom and Briggs plume top are computed by two external
//! executables, `feps_weather` and `feps_plumerise`, which communicate
//! through files in a working directory:
//!
//! 1. `weather.txt` → `feps_weather` → `diurnal.txt`
//! 1. `diurnal.txt`, `profile.txt`, `cons.txt` → `feps_plumerise` → `plume.txt`
//!
//! Each row of `plume.txt` is then resolved to final plume bounds per
//! the configured [`PlumeTopBehavior`].

mod behavior;
mod input;
mod output;
mod tools;

pub use self::{
    behavior::{PlumeBounds, PlumeTopBehavior},
    input::{
        write_consumption, write_profile, write_weather, Consumption, FireLocationInfo,
        HourlyFractions, TimeProfile, WeatherParameters,
    },
    output::{read_plume, PlumeRow},
};
use crate::{distribution::DistributionMode, error::PlumeRiseError, PlumeRise};
use chrono::NaiveDateTime;
use input::write_file;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    ffi::OsStr,
    path::{Path, PathBuf},
};

pub const WEATHER_FILE: &str = "weather.txt";
pub const DIURNAL_FILE: &str = "diurnal.txt";
pub const PROFILE_FILE: &str = "profile.txt";
pub const CONSUMPTION_FILE: &str = "cons.txt";
pub const PLUME_FILE: &str = "plume.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FepsConfig {
    /// Diurnal weather synthesizer (name on `PATH`, or path).
    pub feps_weather_binary: PathBuf,
    /// Plume bottom/top calculator (name on `PATH`, or path).
    pub feps_plumerise_binary: PathBuf,
    pub plume_top_behavior: PlumeTopBehavior,
    pub distribution: DistributionMode,
}

impl Default for FepsConfig {
    fn default() -> Self {
        Self {
            feps_weather_binary: PathBuf::from("feps_weather"),
            feps_plumerise_binary: PathBuf::from("feps_plumerise"),
            plume_top_behavior: PlumeTopBehavior::Auto,
            distribution: DistributionMode::Layers,
        }
    }
}

/// Result of a FEPS run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FepsOutput {
    /// Heat released per hour, as reported by the plume tool.
    pub heat: BTreeMap<NaiveDateTime, f64>,
    pub hours: PlumeRise,
}

#[derive(Debug, Clone, Default)]
pub struct FepsPlumeRise {
    config: FepsConfig,
}

impl FepsPlumeRise {
    pub fn new(config: FepsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FepsConfig {
        &self.config
    }

    /// Computes plume rise for every hour of `profile`.
    ///
    /// Unset fields of `location` are filled with defaults. Intermediate
    /// files are written to `working_dir`, which must not be shared
    /// with a concurrent run; with no `working_dir` a temporary
    /// directory is used and removed before returning.
    pub fn compute(
        &self,
        profile: &TimeProfile,
        consumption: &Consumption,
        location: &mut FireLocationInfo,
        working_dir: Option<&Path>,
    ) -> Result<FepsOutput, PlumeRiseError> {
        info!("running FEPS plume rise; hours: {}", profile.len());

        let tmp_dir;
        let working_dir = match working_dir {
            Some(dir) => dir,
            None => {
                tmp_dir = tempfile::tempdir()?;
                tmp_dir.path()
            }
        };
        debug!("FEPS working dir: {working_dir:?}");

        let plume_file = self.plume_file(profile, consumption, location, working_dir)?;
        let rows = output::read_plume_file(&plume_file)?;
        self.assemble(profile, &rows)
    }

    /// Resolves each row of plume tool output into the hour's
    /// distribution.
    ///
    /// Row `i` belongs to the `i`th hour of `profile`.
    pub fn assemble(
        &self,
        profile: &TimeProfile,
        rows: &[PlumeRow],
    ) -> Result<FepsOutput, PlumeRiseError> {
        if rows.len() != profile.len() {
            return Err(PlumeRiseError::RowCount {
                expected: profile.len(),
                found: rows.len(),
            });
        }

        let mut heat = BTreeMap::new();
        let mut hours = PlumeRise::new();
        for (&timestamp, row) in profile.keys().zip(rows) {
            let PlumeBounds { bottom, top } =
                self.config
                    .plume_top_behavior
                    .resolve(row.plume_top, row.plume_bot, row.heat);
            let record = self
                .config
                .distribution
                .build(row.smold_frac, Some(top), Some(bottom));
            heat.insert(timestamp, row.heat);
            hours.insert(timestamp, record);
        }
        Ok(FepsOutput { heat, hours })
    }

    fn plume_file(
        &self,
        profile: &TimeProfile,
        consumption: &Consumption,
        location: &mut FireLocationInfo,
        working_dir: &Path,
    ) -> Result<PathBuf, PlumeRiseError> {
        let weather = location.fill_defaults();
        let diurnal_file = self.diurnal_file(&weather, working_dir)?;

        let profile_file = working_dir.join(PROFILE_FILE);
        let consumption_file = working_dir.join(CONSUMPTION_FILE);
        let plume_file = working_dir.join(PLUME_FILE);

        write_file(&profile_file, |wtr| write_profile(wtr, profile))?;
        write_file(&consumption_file, |wtr| {
            write_consumption(wtr, consumption, weather.moisture_duff)
        })?;

        let area = location.area.to_string();
        tools::run(
            &self.config.feps_plumerise_binary,
            [
                OsStr::new("-w"),
                diurnal_file.as_os_str(),
                OsStr::new("-p"),
                profile_file.as_os_str(),
                OsStr::new("-c"),
                consumption_file.as_os_str(),
                OsStr::new("-a"),
                OsStr::new(&area),
                OsStr::new("-o"),
                plume_file.as_os_str(),
            ],
        )?;

        Ok(plume_file)
    }

    fn diurnal_file(
        &self,
        weather: &WeatherParameters,
        working_dir: &Path,
    ) -> Result<PathBuf, PlumeRiseError> {
        let weather_file = working_dir.join(WEATHER_FILE);
        let diurnal_file = working_dir.join(DIURNAL_FILE);

        write_file(&weather_file, |wtr| write_weather(wtr, weather))?;
        tools::run(
            &self.config.feps_weather_binary,
            [
                OsStr::new("-w"),
                weather_file.as_os_str(),
                OsStr::new("-o"),
                diurnal_file.as_os_str(),
            ],
        )?;

        Ok(diurnal_file)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Consumption, FepsConfig, FepsPlumeRise, FireLocationInfo, PlumeRow, PlumeTopBehavior,
        TimeProfile,
    };
    use crate::{distribution::DistributionMode, PlumeRiseError};
    use approx::assert_relative_eq;
    use chrono::NaiveDateTime;
    use std::{
        fs,
        path::{Path, PathBuf},
        sync::OnceLock,
    };

    const PLUME_FIXTURE: &str = "hour, heat, smold_frac, plume_bot, plume_top\n0, 2082570545595.600342, 0.050000, 614.072536, 18160.408515\n1, 1110703180280.029053, 0.493334, 614.072536, 16164.954419\n2, 1110703180280.029053, 0.493334, 614.072536, 16156.323741\n";

    fn ts(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn timeprofile() -> TimeProfile {
        serde_json::from_str(
            r#"{
                "2014-05-29T22:00:00": {
                    "area_fraction": 0.3333333333333333,
                    "flaming": 0.3333333333333333,
                    "residual": 0.3333333333333333,
                    "smoldering": 0.3333333333333333
                },
                "2014-05-29T23:00:00": {
                    "area_fraction": 0.3333333333333333,
                    "flaming": 0.3333333333333333,
                    "residual": 0.3333333333333333,
                    "smoldering": 0.3333333333333333
                },
                "2014-05-30T00:00:00": {
                    "area_fraction": 0.3333333333333333,
                    "flaming": 0.3333333333333333,
                    "residual": 0.3333333333333333,
                    "smoldering": 0.3333333333333333
                }
            }"#,
        )
        .unwrap()
    }

    fn consumption() -> Consumption {
        Consumption {
            flaming: 2165.6831964258654,
            smoldering: 2091.3473506535884,
            residual: 1761.0414186789003,
            duff: None,
        }
    }

    fn location() -> FireLocationInfo {
        serde_json::from_str(
            r#"{
                "area": 200,
                "ecoregion": "southern",
                "latitude": 47.4316976,
                "longitude": -121.3990506,
                "max_humid": 80,
                "max_temp": 30,
                "max_temp_hour": 14,
                "max_wind": 6,
                "max_wind_aloft": 6,
                "min_humid": 40,
                "min_temp": 13,
                "min_temp_hour": 4,
                "min_wind": 6,
                "min_wind_aloft": 6,
                "moisture_duff": 100.0,
                "rain_days": 8,
                "snow_month": 5,
                "sunrise_hour": 3,
                "sunset_hour": 19,
                "utc_offset": "-09:00"
            }"#,
        )
        .unwrap()
    }

    /// Stand-ins for the FEPS executables, written once before any of
    /// them is run.
    #[cfg(unix)]
    struct Stubs {
        _dir: tempfile::TempDir,
        weather: PathBuf,
        plumerise: PathBuf,
        failing: PathBuf,
    }

    #[cfg(unix)]
    fn stubs() -> &'static Stubs {
        use std::os::unix::fs::PermissionsExt;

        fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        static STUBS: OnceLock<Stubs> = OnceLock::new();
        STUBS.get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let weather = stub(
                dir.path(),
                "feps_weather",
                r#"while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
echo "hour, temp, humid, wind_flame, modified_wind, stability, dif_temp_grad" > "$out"
"#,
            );
            // Copies `plume.fixture` from the working dir into place.
            let plumerise = stub(
                dir.path(),
                "feps_plumerise",
                r#"while [ $# -gt 0 ]; do
  case "$1" in
    -w) diurnal="$2" ;;
    -p) profile="$2" ;;
    -c) cons="$2" ;;
    -a) area="$2" ;;
    -o) out="$2" ;;
  esac
  shift
done
test -f "$diurnal" && test -f "$profile" && test -f "$cons" || exit 2
echo "$area" > "$(dirname "$out")/area.txt"
cp "$(dirname "$out")/plume.fixture" "$out"
"#,
            );
            let failing = stub(
                dir.path(),
                "feps_broken",
                "echo 'no diurnal cycle today' >&2\nexit 3\n",
            );
            Stubs {
                _dir: dir,
                weather,
                plumerise,
                failing,
            }
        })
    }

    #[cfg(unix)]
    fn stub_config() -> FepsConfig {
        FepsConfig {
            feps_weather_binary: stubs().weather.clone(),
            feps_plumerise_binary: stubs().plumerise.clone(),
            ..FepsConfig::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_compute() {
        let working_dir = tempfile::tempdir().unwrap();
        fs::write(working_dir.path().join("plume.fixture"), PLUME_FIXTURE).unwrap();

        let mut location = location();
        let output = FepsPlumeRise::new(stub_config())
            .compute(
                &timeprofile(),
                &consumption(),
                &mut location,
                Some(working_dir.path()),
            )
            .unwrap();

        let read = |name: &str| fs::read_to_string(working_dir.path().join(name)).unwrap();
        assert_eq!(
            read("weather.txt"),
            "sunsetTime=19\nmiddayTime=14\npredawnTime=4\nminHumid=40.000000\nmaxHumid=80.000000\nminTemp=13.000000\nmaxTemp=30.000000\nminWindAtFlame=6.000000\nmaxWindAtFlame=6.000000\nminWindAloft=6.000000\nmaxWindAloft=6.000000\n"
        );
        assert_eq!(
            read("profile.txt"),
            "hour, area_fract, flame, smolder, residual\n0, 0.333333, 0.333333, 0.333333, 0.333333\n1, 0.333333, 0.333333, 0.333333, 0.333333\n2, 0.333333, 0.333333, 0.333333, 0.333333\n"
        );
        assert_eq!(
            read("cons.txt"),
            "cons_flm=2165.683196\ncons_sts=2091.347351\ncons_lts=1761.041419\ncons_duff=0.000000\nmoist_duff=100.000000\n"
        );
        assert_eq!(read("area.txt"), "200\n");
        assert!(working_dir.path().join("diurnal.txt").exists());

        assert_eq!(output.hours.len(), 3);
        assert_eq!(output.heat.len(), 3);
        assert_eq!(
            output.heat[&ts("2014-05-29T22:00:00")],
            2_082_570_545_595.600_342
        );

        let first = &output.hours[&ts("2014-05-29T22:00:00")];
        assert_eq!(first.smolder_fraction, 0.05);
        let heights = first.heights().unwrap();
        assert_eq!(heights[0], 614.072536);
        assert_eq!(heights[20], 18160.408515);
        assert_relative_eq!(heights[1], 1491.389_334_95, epsilon = 1e-8);
        assert_relative_eq!(heights[13], 12019.190_922_35, epsilon = 1e-8);

        let last = &output.hours[&ts("2014-05-30T00:00:00")];
        assert_eq!(last.smolder_fraction, 0.493334);
        let heights = last.heights().unwrap();
        assert_relative_eq!(heights[1], 1391.185_096_25, epsilon = 1e-8);
        assert_relative_eq!(heights[12], 9939.423_259, epsilon = 1e-8);
        assert_eq!(heights[20], 16156.323741);
    }

    #[cfg(unix)]
    #[test]
    fn test_compute_percentiles() {
        let working_dir = tempfile::tempdir().unwrap();
        fs::write(working_dir.path().join("plume.fixture"), PLUME_FIXTURE).unwrap();

        let config = FepsConfig {
            distribution: DistributionMode::Percentiles,
            ..stub_config()
        };
        let output = FepsPlumeRise::new(config)
            .compute(
                &timeprofile(),
                &consumption(),
                &mut location(),
                Some(working_dir.path()),
            )
            .unwrap();

        let first = &output.hours[&ts("2014-05-29T22:00:00")];
        assert_eq!(first.percentile(0), Some(614.072536));
        assert_eq!(first.percentile(100), Some(18160.408515));
        assert_eq!(first.heights(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_default_working_dir() {
        // Without a fixture in the temporary working dir the plume
        // stub's copy fails, which must surface as a tool failure.
        let mut location = FireLocationInfo::new(10.0);
        let result = FepsPlumeRise::new(stub_config()).compute(
            &timeprofile(),
            &consumption(),
            &mut location,
            None,
        );
        assert!(matches!(result, Err(PlumeRiseError::ToolFailed { .. })));
        // Defaults were still applied to the caller's record.
        assert_eq!(location.sunset_hour, Some(18));
        assert_eq!(location.moisture_duff, Some(100.0));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_failure() {
        let working_dir = tempfile::tempdir().unwrap();
        fs::write(working_dir.path().join("plume.fixture"), PLUME_FIXTURE).unwrap();
        let config = FepsConfig {
            feps_weather_binary: stubs().failing.clone(),
            ..stub_config()
        };

        let err = FepsPlumeRise::new(config)
            .compute(
                &timeprofile(),
                &consumption(),
                &mut location(),
                Some(working_dir.path()),
            )
            .unwrap_err();
        match err {
            PlumeRiseError::ToolFailed { stderr, status, .. } => {
                assert_eq!(stderr, "no diurnal cycle today");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error {other:?}"),
        }
        // The plume tool never ran.
        assert!(!working_dir.path().join("plume.txt").exists());
    }

    #[test]
    fn test_missing_tool() {
        let working_dir = tempfile::tempdir().unwrap();
        let config = FepsConfig {
            feps_weather_binary: working_dir.path().join("no_such_feps_weather"),
            ..FepsConfig::default()
        };
        let result = FepsPlumeRise::new(config).compute(
            &timeprofile(),
            &consumption(),
            &mut location(),
            Some(working_dir.path()),
        );
        assert!(matches!(result, Err(PlumeRiseError::ToolSpawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_row_count_mismatch() {
        let working_dir = tempfile::tempdir().unwrap();
        let short: String = PLUME_FIXTURE.lines().take(3).map(|l| format!("{l}\n")).collect();
        fs::write(working_dir.path().join("plume.fixture"), short).unwrap();

        let result = FepsPlumeRise::new(stub_config()).compute(
            &timeprofile(),
            &consumption(),
            &mut location(),
            Some(working_dir.path()),
        );
        assert!(matches!(
            result,
            Err(PlumeRiseError::RowCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_assemble_behaviors() {
        let rows = [
            PlumeRow {
                heat: 0.0,
                smold_frac: 1.0,
                plume_bot: 500.0,
                plume_top: 900.0,
            },
            PlumeRow {
                heat: 1e9,
                smold_frac: 0.5,
                plume_bot: 500.0,
                plume_top: 400.0,
            },
            PlumeRow {
                heat: 1e9,
                smold_frac: 0.5,
                plume_bot: 500.0,
                plume_top: 900.0,
            },
        ];
        let tops = |behavior| {
            let config = FepsConfig {
                plume_top_behavior: behavior,
                distribution: DistributionMode::Percentiles,
                ..FepsConfig::default()
            };
            let output = FepsPlumeRise::new(config)
                .assemble(&timeprofile(), &rows)
                .unwrap();
            output
                .hours
                .values()
                .map(|record| record.percentile(100).unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(tops(PlumeTopBehavior::Briggs), vec![0.0, 400.0, 900.0]);
        assert_eq!(tops(PlumeTopBehavior::Feps), vec![0.0, 1000.0, 1000.0]);
        assert_eq!(tops(PlumeTopBehavior::Auto), vec![0.0, 1000.0, 900.0]);
    }

    #[test]
    fn test_config() {
        let config: FepsConfig = serde_json::from_str(
            r#"{"PLUME_TOP_BEHAVIOR": "Briggs", "FEPS_WEATHER_BINARY": "/opt/feps/bin/feps_weather"}"#,
        )
        .unwrap();
        assert_eq!(config.plume_top_behavior, PlumeTopBehavior::Briggs);
        assert_eq!(
            config.feps_weather_binary,
            PathBuf::from("/opt/feps/bin/feps_weather")
        );
        assert_eq!(config.feps_plumerise_binary, PathBuf::from("feps_plumerise"));
        assert_eq!(config.distribution, DistributionMode::Layers);

        let err = serde_json::from_str::<FepsConfig>(r#"{"PLUME_TOP_BEHAVIOR": "sometimes"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("PLUME_TOP_BEHAVIOR"));
    }
}
