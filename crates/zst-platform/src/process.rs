//! Child process helpers

use crate::error::{PlatformError, Result};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Build a command whose process dies with its future
pub(crate) fn command(program: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run to completion and collect output, whatever the exit status
pub(crate) async fn output(program: &str, args: &[&str]) -> Result<Output> {
    command(program, args)
        .output()
        .await
        .map_err(|source| PlatformError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Run to completion, failing on a non-zero exit
pub(crate) async fn checked(program: &str, args: &[&str]) -> Result<Output> {
    let out = output(program, args).await?;
    if out.status.success() {
        Ok(out)
    } else {
        Err(PlatformError::CommandFailed {
            program: program.to_string(),
            code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        })
    }
}

/// Seconds as accepted by `ping -W` and `curl -m` ("1.5", "3")
pub(crate) fn secs_arg(duration: Duration) -> String {
    format!("{}", duration.as_secs_f64())
}
