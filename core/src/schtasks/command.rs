use crate::schtasks::error::SchtasksError;
use log::{error, warn};
use serde::Serialize;
use std::process::Command;

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `schtasks` with the provided arguments and capture its output.
pub(crate) fn run_schtasks(args: &[String]) -> Result<CommandResult, SchtasksError> {
    warn!("[schtasks] Executing schtasks with args: {args:?}");

    let mut comm = Command::new("schtasks");
    comm.args(args);
    let out = match comm.output() {
        Ok(result) => result,
        Err(err) => {
            error!("[schtasks] Could not spawn schtasks: {err:?}");
            return Err(SchtasksError::Spawn);
        }
    };

    Ok(CommandResult {
        success: out.status.success(),
        stdout: String::from_utf8_lossy(&out.stdout).to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    })
}
