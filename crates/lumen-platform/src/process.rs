use std::io;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

/// Spawns `command` and hands the child to a short-lived thread that waits on it, so
/// fire-and-forget helpers never linger as zombies. Join the handle to observe the exit
/// status; dropping it detaches the waiter.
pub fn spawn_reaped(command: &mut Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    let program = command.get_program().to_string_lossy().into_owned();

    thread::Builder::new()
        .name(format!("reap-{}", child.id()))
        .spawn(move || {
            let status = child.wait()?;
            if !status.success() {
                log::debug!("'{}' exited with {}", program, status);
            }
            Ok(status)
        })
}
