//! Invocation of the external FEPS executables.

use crate::error::PlumeRiseError;
use log::debug;
use std::{ffi::OsStr, path::Path, process::Command};

/// Runs `tool` with `args` to completion.
///
/// Blocks until the tool exits; there is no timeout. Anything the tool
/// prints is logged at debug level.
pub(crate) fn run<I, S>(tool: &Path, args: I) -> Result<(), PlumeRiseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(tool);
    cmd.args(args);
    debug!("running {cmd:?}");

    let output = cmd.output().map_err(|source| PlumeRiseError::ToolSpawn {
        tool: tool.to_path_buf(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        debug!("{tool:?} stdout: {}", stdout.trim_end());
    }

    if output.status.success() {
        if !stderr.trim().is_empty() {
            debug!("{tool:?} stderr: {}", stderr.trim_end());
        }
        Ok(())
    } else {
        Err(PlumeRiseError::ToolFailed {
            tool: tool.to_path_buf(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        })
    }
}
