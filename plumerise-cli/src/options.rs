use anyhow::{Context, Error as AnyError};
use clap::{Args, Parser, Subcommand};
use plumerise::{DistributionMode, FepsConfig, PlumeTopBehavior, SevConfig};
use serde::de::DeserializeOwned;
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

/// A tool for computing the vertical distribution of wildfire smoke.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Write JSON results to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Pretty-print JSON results.
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plume rise from hourly met soundings (SEV model).
    Sev(Sev),

    /// Plume rise from the external FEPS executables.
    Feps(Feps),
}

#[derive(Debug, Clone, Args)]
pub struct Sev {
    /// JSON file of hourly soundings keyed by timestamp.
    #[arg(long)]
    pub met: PathBuf,

    /// Fire area.
    #[arg(short, long)]
    pub area: f64,

    /// Smoldering fraction of emissions, applied to every hour.
    #[arg(long, default_value_t = 0.0)]
    pub smolder_fraction: f64,

    /// Fire radiative power (W). Estimated from area if absent.
    #[arg(long, allow_negative_numbers = true)]
    pub frp: Option<f64>,

    /// JSON file of model constants (ALPHA, BETA, ...).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output shape: "layers" or "percentiles".
    #[arg(long)]
    pub distribution: Option<DistributionMode>,
}

impl Sev {
    /// Returns the config file's constants with command line
    /// overrides applied.
    pub fn config(&self) -> Result<SevConfig, AnyError> {
        let mut config = match &self.config {
            Some(path) => read_json(path)?,
            None => SevConfig::default(),
        };
        if let Some(distribution) = self.distribution {
            config.distribution = distribution;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct Feps {
    /// JSON file with "timeprofile", "consumption" and "location".
    #[arg(short, long)]
    pub input: PathBuf,

    /// Keep intermediate files in this directory.
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,

    /// JSON file of model options (PLUME_TOP_BEHAVIOR, ...).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the feps_weather executable.
    #[arg(long)]
    pub weather_binary: Option<PathBuf>,

    /// Path to the feps_plumerise executable.
    #[arg(long)]
    pub plumerise_binary: Option<PathBuf>,

    /// Plume top model: "briggs", "feps" or "auto".
    #[arg(long)]
    pub behavior: Option<PlumeTopBehavior>,

    /// Output shape: "layers" or "percentiles".
    #[arg(long)]
    pub distribution: Option<DistributionMode>,
}

impl Feps {
    /// Returns the config file's options with command line overrides
    /// applied.
    pub fn config(&self) -> Result<FepsConfig, AnyError> {
        let mut config = match &self.config {
            Some(path) => read_json(path)?,
            None => FepsConfig::default(),
        };
        if let Some(path) = &self.weather_binary {
            config.feps_weather_binary = path.clone();
        }
        if let Some(path) = &self.plumerise_binary {
            config.feps_plumerise_binary = path.clone();
        }
        if let Some(behavior) = self.behavior {
            config.plume_top_behavior = behavior;
        }
        if let Some(distribution) = self.distribution {
            config.distribution = distribution;
        }
        Ok(config)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AnyError> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;
    use plumerise::{DistributionMode, PlumeTopBehavior};
    use std::path::PathBuf;

    #[test]
    fn test_sev_args() {
        let cli = Cli::try_parse_from([
            "plumerise-cli",
            "sev",
            "--met",
            "met.json",
            "--area",
            "200",
            "--frp",
            "-5",
            "--distribution",
            "layers",
        ])
        .unwrap();
        let Command::Sev(sev) = cli.cmd else {
            panic!("expected sev");
        };
        assert_eq!(sev.area, 200.0);
        assert_eq!(sev.frp, Some(-5.0));
        assert_eq!(sev.smolder_fraction, 0.0);

        let config = sev.config().unwrap();
        assert_eq!(config.distribution, DistributionMode::Layers);
        assert_eq!(config.alpha, 0.24);
    }

    #[test]
    fn test_feps_args() {
        let cli = Cli::try_parse_from([
            "plumerise-cli",
            "--pretty",
            "feps",
            "--input",
            "fire.json",
            "--behavior",
            "FEPS",
            "--plumerise-binary",
            "/opt/feps/bin/feps_plumerise",
        ])
        .unwrap();
        assert!(cli.pretty);
        let Command::Feps(feps) = cli.cmd else {
            panic!("expected feps");
        };

        let config = feps.config().unwrap();
        assert_eq!(config.plume_top_behavior, PlumeTopBehavior::Feps);
        assert_eq!(
            config.feps_plumerise_binary,
            PathBuf::from("/opt/feps/bin/feps_plumerise")
        );
        assert_eq!(config.feps_weather_binary, PathBuf::from("feps_weather"));
        assert_eq!(config.distribution, DistributionMode::Layers);
    }

    #[test]
    fn test_unknown_behavior() {
        let result = Cli::try_parse_from([
            "plumerise-cli",
            "feps",
            "--input",
            "fire.json",
            "--behavior",
            "sometimes",
        ]);
        assert!(result.is_err());
    }
}
