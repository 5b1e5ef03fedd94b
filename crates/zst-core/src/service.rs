//! Managed service control interface
//!
//! Implemented by the platform crate (systemd); tests use mocks.

use crate::error::Result;
use async_trait::async_trait;

/// Control over the service running the firewall rules
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Whether the service is currently running
    async fn is_active(&self) -> Result<bool>;

    /// Restart (or start) the service
    async fn restart(&self) -> Result<()>;

    /// Stop the service
    async fn stop(&self) -> Result<()>;
}
