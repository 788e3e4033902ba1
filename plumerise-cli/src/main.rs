mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use log::info;
use options::{read_json, Cli, Command as CliCmd};
use plumerise::{
    feps::{Consumption, FireLocationInfo, TimeProfile},
    FepsPlumeRise, MetProfile, SevPlumeRise,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// Everything a FEPS run needs besides configuration.
#[derive(Deserialize)]
struct FepsInput {
    timeprofile: TimeProfile,
    consumption: Consumption,
    location: FireLocationInfo,
}

fn main() -> Result<(), AnyError> {
    let Cli { out, pretty, cmd } = Cli::parse();

    env_logger::init();

    let json = match cmd {
        CliCmd::Sev(args) => {
            let met: MetProfile = read_json(&args.met)?;
            let plume_rise = SevPlumeRise::new(args.config()?).compute(
                &met,
                args.area,
                args.smolder_fraction,
                args.frp,
            )?;
            info!("computed plume rise for {} of {} hours", plume_rise.len(), met.len());
            to_json(&plume_rise, pretty)?
        }
        CliCmd::Feps(args) => {
            let FepsInput {
                timeprofile,
                consumption,
                mut location,
            } = read_json(&args.input)?;
            let output = FepsPlumeRise::new(args.config()?).compute(
                &timeprofile,
                &consumption,
                &mut location,
                args.working_dir.as_deref(),
            )?;
            to_json(&output, pretty)?
        }
    };

    match out {
        Some(path) => {
            let mut wtr = BufWriter::new(File::create(path)?);
            writeln!(wtr, "{json}")?;
            wtr.flush()?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, AnyError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
