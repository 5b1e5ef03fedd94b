//! Session progress reporting
//!
//! Progress flows through a `tokio::sync::watch` channel: the engine writes,
//! the presentation layer reads the latest value. Intermediate updates may be
//! skipped by slow readers, which is fine for a status line.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// What the session is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Copying config and restarting the service
    Applying,
    /// Pinging the reference host
    Baseline,
    /// Probing targets
    Probing,
    /// Smart exit fired
    Aborted,
    /// Strategy finished
    Done,
}

impl Phase {
    /// Short label for the status line
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Applying => "applying",
            Phase::Baseline => "baseline",
            Phase::Probing => "testing",
            Phase::Aborted => "ABORTED",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest progress snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Strategy under test
    pub strategy: String,
    /// Current phase
    pub phase: Phase,
    /// Last target touched (empty when not applicable)
    pub target: String,
    /// Probes finished
    pub completed: usize,
    /// Probes scheduled
    pub total: usize,
}

impl Status {
    /// Completion percentage, 0 when nothing is scheduled
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// Write side of the status channel
///
/// A disabled handle drops every update.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    tx: Option<Arc<watch::Sender<Option<Status>>>>,
}

impl StatusHandle {
    /// Create a connected handle and its reader
    pub fn channel() -> (Self, watch::Receiver<Option<Status>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx: Some(Arc::new(tx)) }, rx)
    }

    /// Handle that discards updates
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Publish a new status
    pub fn update(&self, strategy: &str, phase: Phase, target: &str, completed: usize, total: usize) {
        if let Some(tx) = &self.tx {
            tx.send_replace(Some(Status {
                strategy: strategy.to_string(),
                phase,
                target: target.to_string(),
                completed,
                total,
            }));
        }
    }

    /// Clear the status (nothing in progress)
    pub fn clear(&self) {
        if let Some(tx) = &self.tx {
            tx.send_replace(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let (handle, rx) = StatusHandle::channel();
        handle.update("s1", Phase::Probing, "a.com", 1, 4);
        handle.update("s1", Phase::Probing, "b.com", 2, 4);

        let status = rx.borrow().clone().unwrap();
        assert_eq!(status.target, "b.com");
        assert_eq!(status.percent(), 50);

        handle.clear();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_disabled_handle_is_silent() {
        let handle = StatusHandle::disabled();
        handle.update("s1", Phase::Baseline, "", 0, 0);
        handle.clear();
    }
}
