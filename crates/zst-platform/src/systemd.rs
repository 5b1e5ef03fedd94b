//! Service control through `systemctl`

use crate::process::{checked, output};
use async_trait::async_trait;
use tracing::debug;
use zst_core::{Error, Result, ServiceControl};

/// A systemd unit driven through `systemctl`
#[derive(Debug, Clone)]
pub struct SystemdService {
    unit: String,
    systemctl: String,
}

impl SystemdService {
    /// Control `unit` with the system `systemctl`
    pub fn new(unit: impl Into<String>) -> Self {
        Self::with_systemctl(unit, "systemctl")
    }

    /// Control `unit` with a specific `systemctl` binary
    pub fn with_systemctl(unit: impl Into<String>, systemctl: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            systemctl: systemctl.into(),
        }
    }

    /// Unit name
    pub fn unit(&self) -> &str {
        &self.unit
    }

    async fn run(&self, action: &'static str) -> Result<()> {
        debug!(unit = %self.unit, action, "systemctl");
        checked(&self.systemctl, &[action, &self.unit])
            .await
            .map(|_| ())
            .map_err(|e| Error::service(&self.unit, action, e.to_string()))
    }
}

#[async_trait]
impl ServiceControl for SystemdService {
    async fn is_active(&self) -> Result<bool> {
        // Non-zero exit just means "not active"
        let out = output(&self.systemctl, &["is-active", &self.unit])
            .await
            .map_err(|e| Error::service(&self.unit, "is-active", e.to_string()))?;
        Ok(out.status.success())
    }

    async fn restart(&self) -> Result<()> {
        self.run("restart").await
    }

    async fn stop(&self) -> Result<()> {
        self.run("stop").await
    }
}
