//! System state snapshot and rollback
//!
//! The [`StateManager`] captures the live zapret config, the host allow-list
//! and the service run state before the first strategy is applied, and puts
//! them back at the end of the session unless a strategy was committed.

use crate::config::PathsConfig;
use crate::error::{Error, Result};
use crate::service::ServiceControl;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Contents of a managed file at backup time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    /// The file existed with these bytes
    Present(Vec<u8>),
    /// The file did not exist
    Absent,
}

impl FileState {
    /// Read the current state of `path`
    pub async fn capture(path: &Path) -> Result<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Self::Present(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::Absent),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Put `path` back into this state
    pub async fn reapply(&self, path: &Path) -> std::io::Result<()> {
        match self {
            Self::Present(bytes) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, bytes).await
            }
            Self::Absent => match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        }
    }
}

/// Pre-run system state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// Live zapret config
    pub config: FileState,
    /// Host allow-list
    pub allow_list: FileState,
    /// Whether the service was running
    pub service_was_active: bool,
}

/// Files mutated during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPaths {
    /// Live zapret config
    pub config: PathBuf,
    /// Host allow-list
    pub allow_list: PathBuf,
}

impl From<&PathsConfig> for ManagedPaths {
    fn from(paths: &PathsConfig) -> Self {
        Self {
            config: paths.zapret_config.clone(),
            allow_list: paths.hostlist.clone(),
        }
    }
}

/// Why a restore did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A strategy was committed
    Committed,
    /// `backup()` never ran
    NoSnapshot,
}

/// Result of a restore attempt
#[derive(Debug)]
pub enum RestoreReport {
    /// Every step succeeded
    Restored,
    /// Some steps failed; the system may still run the last tested strategy
    Partial(Vec<Error>),
    /// Nothing was done
    Skipped(SkipReason),
}

impl RestoreReport {
    /// Whether the system is known to be back in its pre-run state
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

/// Owns the snapshot and the commit flag for one session
pub struct StateManager {
    paths: ManagedPaths,
    service: Arc<dyn ServiceControl>,
    snapshot: Mutex<Option<SystemSnapshot>>,
    committed: AtomicBool,
}

impl StateManager {
    /// Create a manager; nothing is captured until [`backup`](Self::backup)
    pub fn new(paths: ManagedPaths, service: Arc<dyn ServiceControl>) -> Self {
        Self {
            paths,
            service,
            snapshot: Mutex::new(None),
            committed: AtomicBool::new(false),
        }
    }

    /// Paths under management
    pub fn paths(&self) -> &ManagedPaths {
        &self.paths
    }

    /// Capture the pre-run state. Must run once, before any mutation.
    pub async fn backup(&self) -> Result<()> {
        if self.snapshot.lock().is_some() {
            return Err(Error::SnapshotTaken);
        }

        let snapshot = SystemSnapshot {
            config: FileState::capture(&self.paths.config).await?,
            allow_list: FileState::capture(&self.paths.allow_list).await?,
            service_was_active: self.service.is_active().await?,
        };

        info!(
            config_present = matches!(snapshot.config, FileState::Present(_)),
            allow_list_present = matches!(snapshot.allow_list, FileState::Present(_)),
            service_was_active = snapshot.service_was_active,
            "Captured system snapshot"
        );

        let mut slot = self.snapshot.lock();
        if slot.is_some() {
            return Err(Error::SnapshotTaken);
        }
        *slot = Some(snapshot);
        Ok(())
    }

    /// Copy of the captured snapshot
    pub fn snapshot(&self) -> Option<SystemSnapshot> {
        self.snapshot.lock().clone()
    }

    /// Keep the current system state; later restores become no-ops
    pub fn commit(&self) {
        self.committed.store(true, Ordering::SeqCst);
        self.snapshot.lock().take();
        info!("Committed current system state");
    }

    /// Whether [`commit`](Self::commit) was called
    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::SeqCst)
    }

    /// Revert to the snapshot, best effort
    ///
    /// Every step is attempted even when an earlier one fails. Safe to call
    /// repeatedly; each call converges on the same state.
    pub async fn restore(&self) -> RestoreReport {
        if self.is_committed() {
            return RestoreReport::Skipped(SkipReason::Committed);
        }
        let Some(snapshot) = self.snapshot() else {
            warn!("No snapshot to restore");
            return RestoreReport::Skipped(SkipReason::NoSnapshot);
        };

        info!("Restoring original system state");
        let mut failures = Vec::new();

        if let Err(e) = snapshot.config.reapply(&self.paths.config).await {
            failures.push(Error::Restore {
                step: "config",
                reason: e.to_string(),
            });
        }

        if let Err(e) = snapshot.allow_list.reapply(&self.paths.allow_list).await {
            failures.push(Error::Restore {
                step: "allow-list",
                reason: e.to_string(),
            });
        }

        let service = if snapshot.service_was_active {
            self.service.restart().await
        } else {
            self.service.stop().await
        };
        if let Err(e) = service {
            failures.push(Error::Restore {
                step: "service",
                reason: e.to_string(),
            });
        }

        if failures.is_empty() {
            info!("Original system state restored");
            RestoreReport::Restored
        } else {
            for failure in &failures {
                error!(error = %failure, "Restore step failed");
            }
            RestoreReport::Partial(failures)
        }
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("paths", &self.paths)
            .field("committed", &self.is_committed())
            .finish_non_exhaustive()
    }
}
