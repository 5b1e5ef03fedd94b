//! Single-line progress display on stderr

use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use zst_core::Status;

const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

fn enabled() -> bool {
    atty::is(atty::Stream::Stderr)
}

/// Render a status as one line
pub fn format_status(status: &Status) -> String {
    let progress = format!("{}% ({}/{})", status.percent(), status.completed, status.total);
    format!(
        "{} {:<17.17} | {} {:<10} {:<30.30} | {} {}",
        "strategy:".cyan(),
        status.strategy,
        "status:".cyan(),
        status.phase.as_str(),
        status.target,
        "progress:".cyan(),
        progress
    )
}

/// Erase the status line
pub fn clear() {
    if enabled() {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[K");
        let _ = stderr.flush();
    }
}

/// Redraw the status line whenever the session publishes progress
///
/// The task ends when every status sender is gone.
pub fn spawn(mut rx: watch::Receiver<Option<Status>>) -> Option<JoinHandle<()>> {
    if !enabled() {
        return None;
    }

    Some(tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            match status {
                Some(status) => {
                    let mut stderr = std::io::stderr().lock();
                    let _ = write!(stderr, "\r\x1b[K{}", format_status(&status));
                    let _ = stderr.flush();
                }
                None => clear(),
            }
            tokio::time::sleep(REDRAW_INTERVAL).await;
        }
        clear();
    }))
}
