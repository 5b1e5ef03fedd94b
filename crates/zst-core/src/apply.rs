//! Applying a strategy to the live system
//!
//! A strategy is applied by copying its config over the live zapret config
//! (with `FWTYPE=` pinned to the detected firewall backend), installing the
//! target list as the host allow-list and restarting the service.

use crate::error::{Error, Result};
use crate::service::ServiceControl;
use crate::state::ManagedPaths;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const FWTYPE_KEY: &[u8] = b"FWTYPE=";

/// Firewall backend zapret drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallBackend {
    /// Legacy iptables
    Iptables,
    /// nftables (also iptables-nft)
    Nftables,
}

impl FirewallBackend {
    /// Value written after `FWTYPE=`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iptables => "iptables",
            Self::Nftables => "nftables",
        }
    }

    /// Interpret `iptables --version` output
    ///
    /// Only the legacy flavour is driven through iptables; anything else,
    /// including empty output, means nftables.
    pub fn from_version_output(output: &str) -> Self {
        if output.contains("legacy") {
            Self::Iptables
        } else {
            Self::Nftables
        }
    }
}

impl fmt::Display for FirewallBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrite every `FWTYPE=` line to the given backend
///
/// Other lines and all line endings pass through untouched.
pub fn patch_fwtype(content: &[u8], backend: FirewallBackend) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 16);
    for line in content.split_inclusive(|b| *b == b'\n') {
        if !line.starts_with(FWTYPE_KEY) {
            out.extend_from_slice(line);
            continue;
        }
        let ending: &[u8] = if line.ends_with(b"\r\n") {
            b"\r\n"
        } else if line.ends_with(b"\n") {
            b"\n"
        } else {
            b""
        };
        out.extend_from_slice(FWTYPE_KEY);
        out.extend_from_slice(backend.as_str().as_bytes());
        out.extend_from_slice(ending);
    }
    out
}

/// Installs strategies onto the live system
pub struct StrategyApplier {
    paths: ManagedPaths,
    allow_list_source: PathBuf,
    backend: FirewallBackend,
    service: Arc<dyn ServiceControl>,
    restart_delay: Duration,
}

impl StrategyApplier {
    /// Create an applier
    ///
    /// `allow_list_source` is copied to the managed allow-list path on every
    /// apply.
    pub fn new(
        paths: ManagedPaths,
        allow_list_source: impl Into<PathBuf>,
        backend: FirewallBackend,
        service: Arc<dyn ServiceControl>,
        restart_delay: Duration,
    ) -> Self {
        Self {
            paths,
            allow_list_source: allow_list_source.into(),
            backend,
            service,
            restart_delay,
        }
    }

    /// Backend written into configs
    pub fn backend(&self) -> FirewallBackend {
        self.backend
    }

    /// Apply `strategy`; every failure is reported as [`Error::Apply`]
    pub async fn apply(&self, strategy: &Strategy) -> Result<()> {
        let name = strategy.name.as_str();
        let fail = |what: &str, e: &dyn fmt::Display| Error::apply(name, format!("{what}: {e}"));

        let content = tokio::fs::read(&strategy.config_path)
            .await
            .map_err(|e| fail(&format!("reading {}", strategy.config_path.display()), &e))?;
        tokio::fs::write(&self.paths.config, patch_fwtype(&content, self.backend))
            .await
            .map_err(|e| fail(&format!("writing {}", self.paths.config.display()), &e))?;
        debug!(strategy = name, backend = %self.backend, "Config installed");

        if let Some(parent) = self.paths.allow_list.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(&format!("creating {}", parent.display()), &e))?;
        }
        tokio::fs::copy(&self.allow_list_source, &self.paths.allow_list)
            .await
            .map_err(|e| fail("installing allow-list", &e))?;

        self.service
            .restart()
            .await
            .map_err(|e| fail("restarting service", &e))?;

        tokio::time::sleep(self.restart_delay).await;
        info!(strategy = name, "Strategy applied");
        Ok(())
    }
}

impl fmt::Debug for StrategyApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyApplier")
            .field("paths", &self.paths)
            .field("allow_list_source", &self.allow_list_source)
            .field("backend", &self.backend)
            .field("restart_delay", &self.restart_delay)
            .finish_non_exhaustive()
    }
}
