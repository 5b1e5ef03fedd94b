//! Per-target probing
//!
//! [`ProbeRunner`] runs one target's battery of checks: a ping, then for
//! hostnames an HTTP, a TLS 1.2 and a TLS 1.3 HEAD request. The three
//! requests run concurrently so a target costs at most one check timeout.
//!
//! The network work itself is delegated to a [`Pinger`] and an
//! [`HttpProber`]; platform crates provide process-backed implementations.

mod result;

pub use result::{AvailabilityPolicy, CheckOutcome, Latency, Protocol, ProbeResult};

use crate::error::{Error, ProbeError};
use crate::target::DomainTarget;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// ICMP echo collaborator
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Send one echo request and return the round-trip time in milliseconds
    async fn ping(&self, host: &str, timeout: Duration) -> Result<f64, ProbeError>;
}

/// HTTP HEAD collaborator
#[async_trait]
pub trait HttpProber: Send + Sync {
    /// Issue a HEAD request over `protocol` and return the status code
    ///
    /// Dropping the returned future must cancel the request, including any
    /// process spawned for it.
    async fn head(
        &self,
        host: &str,
        protocol: Protocol,
        timeout: Duration,
    ) -> Result<u16, ProbeError>;
}

/// Timeout budgets for one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// Ping timeout handed to the pinger
    pub ping: Duration,
    /// Check timeout handed to the HTTP prober
    pub check: Duration,
    /// Allowance on top of each budget before the check is cancelled
    pub grace: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            ping: Duration::from_millis(1500),
            check: Duration::from_secs(3),
            grace: Duration::from_millis(500),
        }
    }
}

/// Runs the check battery for single targets
///
/// Cheap to clone; clones share the collaborators.
#[derive(Clone)]
pub struct ProbeRunner {
    pinger: Arc<dyn Pinger>,
    http: Arc<dyn HttpProber>,
    timeouts: ProbeTimeouts,
    policy: AvailabilityPolicy,
}

impl ProbeRunner {
    /// Create a runner from its collaborators
    pub fn new(
        pinger: Arc<dyn Pinger>,
        http: Arc<dyn HttpProber>,
        timeouts: ProbeTimeouts,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            pinger,
            http,
            timeouts,
            policy,
        }
    }

    /// Configured budgets
    pub fn timeouts(&self) -> ProbeTimeouts {
        self.timeouts
    }

    /// Ping a host, collapsing every failure into [`Latency::Failed`]
    pub async fn ping(&self, host: &str) -> Latency {
        let budget = self.timeouts.ping + self.timeouts.grace;
        match bounded(budget, self.pinger.ping(host, self.timeouts.ping)).await {
            Ok(ms) => Latency::Millis(ms),
            Err(e) => {
                debug!(host, error = %Error::from(e), "Ping failed");
                Latency::Failed
            }
        }
    }

    /// Probe a target. Never fails; failures become result fields.
    pub async fn probe(&self, target: &DomainTarget) -> ProbeResult {
        let host = target.as_str();
        let latency = self.ping(host).await;

        if target.is_ip() {
            return match latency {
                Latency::Millis(ms) => ProbeResult::reachable_ip(ms),
                Latency::Failed => ProbeResult::unreachable_ip(),
            };
        }

        let (http, tls12, tls13) = tokio::join!(
            self.check(host, Protocol::Http),
            self.check(host, Protocol::Tls12),
            self.check(host, Protocol::Tls13),
        );

        ProbeResult::from_checks(latency, http, tls12, tls13, self.policy)
    }

    async fn check(&self, host: &str, protocol: Protocol) -> CheckOutcome {
        let budget = self.timeouts.check + self.timeouts.grace;
        match bounded(budget, self.http.head(host, protocol, self.timeouts.check)).await {
            Ok(code) => CheckOutcome::Status { protocol, code },
            Err(e) => {
                debug!(host, %protocol, error = %Error::from(e), "Check failed");
                CheckOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for ProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRunner")
            .field("timeouts", &self.timeouts)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Hard wall-clock bound; the inner future is dropped when it fires
async fn bounded<T, F>(budget: Duration, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or(Err(ProbeError::Timeout))
}
