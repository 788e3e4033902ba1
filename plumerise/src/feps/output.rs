//! Plume tool output.
//!
//! # File Format
//!
//! ```text
//! hour, heat, smold_frac, plume_bot, plume_top
//! 0, 2082570545595.600342, 0.050000, 614.072536, 18160.408515
//! 1, 1110703180280.029053, 0.493334, 614.072536, 16164.954419
//! ```
//!
//! Columns may appear in any order and extra columns are ignored.
//! Rows are in the same order as the hourly profile.

use crate::error::PlumeRiseError;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// One hour of plume tool output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlumeRow {
    /// Heat released (BTU).
    pub heat: f64,
    pub smold_frac: f64,
    /// Plume bottom (m).
    pub plume_bot: f64,
    /// Briggs plume top (m).
    pub plume_top: f64,
}

const COLUMNS: [&str; 4] = ["heat", "smold_frac", "plume_bot", "plume_top"];

/// Parses plume tool output from `rdr`.
pub fn read_plume<R: BufRead>(rdr: R) -> Result<Vec<PlumeRow>, PlumeRiseError> {
    let mut lines = rdr
        .lines()
        .enumerate()
        .map(|(idx, line)| line.map(|line| (idx + 1, line)))
        .filter(|line| !matches!(line, Ok((_, text)) if text.trim().is_empty()));

    let Some(header) = lines.next().transpose()? else {
        return Err(PlumeRiseError::Parse {
            line: 0,
            message: "empty plume file".to_string(),
        });
    };
    let names: Vec<&str> = header.1.split(',').map(str::trim).collect();
    let mut idxs = [0; COLUMNS.len()];
    for (idx, column) in idxs.iter_mut().zip(COLUMNS) {
        *idx = names
            .iter()
            .position(|name| *name == column)
            .ok_or(PlumeRiseError::MissingColumn(column))?;
    }

    let mut rows = Vec::new();
    for line in lines {
        let (line_num, text) = line?;
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        let mut values = [0.0; COLUMNS.len()];
        for ((value, &idx), column) in values.iter_mut().zip(&idxs).zip(COLUMNS) {
            let field = fields.get(idx).ok_or_else(|| PlumeRiseError::Parse {
                line: line_num,
                message: format!("missing {column}"),
            })?;
            *value = field.parse().map_err(|_| PlumeRiseError::Parse {
                line: line_num,
                message: format!("invalid {column} {field:?}"),
            })?;
        }
        let [heat, smold_frac, plume_bot, plume_top] = values;
        rows.push(PlumeRow {
            heat,
            smold_frac,
            plume_bot,
            plume_top,
        });
    }
    Ok(rows)
}

pub(crate) fn read_plume_file(path: &Path) -> Result<Vec<PlumeRow>, PlumeRiseError> {
    read_plume(BufReader::new(File::open(path)?))
}
