use crate::config::{ExecCommand, SatelliteId};
use lumen_platform::process;
use std::path::Path;
use std::process::{Command, Stdio};

pub const SATELLITE_ENV: &str = "LUMEN_SATELLITE";
pub const PHOTO_ENV: &str = "LUMEN_PHOTO";

/// Builds the `sh -c` invocation for a satellite action.
pub fn command(exec: &ExecCommand, satellite: &SatelliteId, photo: Option<&Path>) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(exec.as_str())
        .env(SATELLITE_ENV, satellite.as_str())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match photo {
        Some(path) => cmd.env(PHOTO_ENV, path),
        None => cmd.env_remove(PHOTO_ENV),
    };
    cmd
}

pub fn spawn(
    exec: &ExecCommand,
    satellite: &SatelliteId,
    photo: Option<&Path>,
) -> std::io::Result<()> {
    process::spawn_reaped(&mut command(exec, satellite, photo))?;
    Ok(())
}
