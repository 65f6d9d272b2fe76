use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SchedulerError};

/// Run `command` through `/bin/bash -c`, capturing stdout in memory.
/// Stderr is discarded. A launch failure or non-zero exit is an error.
pub async fn run(command: &str) -> Result<String> {
    debug!(%command, "running scheduled command");

    let output = Command::new("/bin/bash")
        .arg("-c")
        .arg(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(SchedulerError::Spawn)?;

    if !output.status.success() {
        return Err(SchedulerError::NonZeroExit {
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
