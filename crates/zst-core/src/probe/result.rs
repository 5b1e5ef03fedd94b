//! Probe result types

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Protocol exercised by a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain HTTP HEAD
    Http,
    /// HTTPS HEAD pinned to TLS 1.2
    Tls12,
    /// HTTPS HEAD pinned to TLS 1.3
    Tls13,
}

impl Protocol {
    /// All protocols in column order
    pub const ALL: [Protocol; 3] = [Protocol::Http, Protocol::Tls12, Protocol::Tls13];

    /// Label used in result cells
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Tls12 => "TLS1.2",
            Protocol::Tls13 => "TLS1.3",
        }
    }

    /// Whether the check runs over TLS
    pub fn is_tls(self) -> bool {
        !matches!(self, Protocol::Http)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round-trip time of a ping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Latency {
    /// Successful echo
    Millis(f64),
    /// No reply, timeout or unparsable output
    Failed,
}

impl Latency {
    /// Milliseconds, `+inf` for failures
    pub fn as_millis(self) -> f64 {
        match self {
            Latency::Millis(ms) => ms,
            Latency::Failed => f64::INFINITY,
        }
    }

    /// Whether the ping succeeded
    pub fn is_ok(self) -> bool {
        matches!(self, Latency::Millis(_))
    }

    /// Total order with failures last
    pub fn cmp_fastest_first(&self, other: &Self) -> Ordering {
        self.as_millis().total_cmp(&other.as_millis())
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Latency::Millis(ms) => write!(f, "{ms:.0}ms"),
            Latency::Failed => f.write_str("FAIL"),
        }
    }
}

/// Outcome of one HTTP/TLS check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The exchange completed with a status code
    Status {
        /// Protocol of the check
        protocol: Protocol,
        /// HTTP status code
        code: u16,
    },
    /// Timeout, connection error or non-numeric response
    Failed,
    /// Check skipped because the target is an IP literal
    NotApplicable,
}

impl CheckOutcome {
    /// Whether the check produced a status code
    pub fn is_success(self) -> bool {
        matches!(self, CheckOutcome::Status { .. })
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Status { protocol, code } => write!(f, "{protocol}:{code}"),
            CheckOutcome::Failed => f.write_str("FAIL"),
            CheckOutcome::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Which checks make a hostname count as available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityPolicy {
    /// TLS 1.2 or TLS 1.3 must succeed; HTTP is diagnostic only
    #[default]
    #[serde(rename = "tls")]
    TlsRequired,
    /// Any successful check counts
    Any,
}

impl AvailabilityPolicy {
    /// Apply the policy to a hostname's three checks
    pub fn is_available(self, http: CheckOutcome, tls12: CheckOutcome, tls13: CheckOutcome) -> bool {
        let tls = tls12.is_success() || tls13.is_success();
        match self {
            AvailabilityPolicy::TlsRequired => tls,
            AvailabilityPolicy::Any => tls || http.is_success(),
        }
    }
}

/// Per-target outcome of a probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Ping latency
    pub latency: Latency,
    /// Plain HTTP check
    pub http: CheckOutcome,
    /// TLS 1.2 check
    pub tls12: CheckOutcome,
    /// TLS 1.3 check
    pub tls13: CheckOutcome,
    /// Derived availability
    pub available: bool,
}

impl ProbeResult {
    /// IP literal that did not answer the ping
    pub fn unreachable_ip() -> Self {
        Self {
            latency: Latency::Failed,
            http: CheckOutcome::Failed,
            tls12: CheckOutcome::Failed,
            tls13: CheckOutcome::Failed,
            available: false,
        }
    }

    /// IP literal that answered the ping
    pub fn reachable_ip(latency_ms: f64) -> Self {
        Self {
            latency: Latency::Millis(latency_ms),
            http: CheckOutcome::NotApplicable,
            tls12: CheckOutcome::NotApplicable,
            tls13: CheckOutcome::NotApplicable,
            available: true,
        }
    }

    /// Hostname result, availability decided by `policy`
    pub fn from_checks(
        latency: Latency,
        http: CheckOutcome,
        tls12: CheckOutcome,
        tls13: CheckOutcome,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            latency,
            http,
            tls12,
            tls13,
            available: policy.is_available(http, tls12, tls13),
        }
    }

    /// Outcome of the check for `protocol`
    pub fn check(&self, protocol: Protocol) -> CheckOutcome {
        match protocol {
            Protocol::Http => self.http,
            Protocol::Tls12 => self.tls12,
            Protocol::Tls13 => self.tls13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(protocol: Protocol) -> CheckOutcome {
        CheckOutcome::Status { protocol, code: 200 }
    }

    #[test]
    fn test_display() {
        assert_eq!(Latency::Millis(12.4).to_string(), "12ms");
        assert_eq!(Latency::Failed.to_string(), "FAIL");
        assert_eq!(
            CheckOutcome::Status { protocol: Protocol::Tls12, code: 301 }.to_string(),
            "TLS1.2:301"
        );
        assert_eq!(CheckOutcome::NotApplicable.to_string(), "N/A");
    }

    #[test]
    fn test_http_alone_is_not_available() {
        let result = ProbeResult::from_checks(
            Latency::Millis(10.0),
            ok(Protocol::Http),
            CheckOutcome::Failed,
            CheckOutcome::Failed,
            AvailabilityPolicy::TlsRequired,
        );
        assert!(!result.available);
    }

    #[test]
    fn test_any_tls_is_available() {
        for (tls12, tls13) in [
            (ok(Protocol::Tls12), CheckOutcome::Failed),
            (CheckOutcome::Failed, ok(Protocol::Tls13)),
        ] {
            let result = ProbeResult::from_checks(
                Latency::Failed,
                CheckOutcome::Failed,
                tls12,
                tls13,
                AvailabilityPolicy::TlsRequired,
            );
            assert!(result.available);
        }
    }

    #[test]
    fn test_any_policy_counts_http() {
        assert!(AvailabilityPolicy::Any.is_available(
            ok(Protocol::Http),
            CheckOutcome::Failed,
            CheckOutcome::Failed
        ));
    }

    #[test]
    fn test_latency_ordering() {
        let mut values = vec![Latency::Failed, Latency::Millis(40.0), Latency::Millis(5.0)];
        values.sort_by(Latency::cmp_fastest_first);
        assert_eq!(values, vec![Latency::Millis(5.0), Latency::Millis(40.0), Latency::Failed]);
    }

    #[test]
    fn test_ip_results() {
        let down = ProbeResult::unreachable_ip();
        assert!(!down.available);
        assert!(Protocol::ALL.iter().all(|p| down.check(*p) == CheckOutcome::Failed));

        let up = ProbeResult::reachable_ip(3.0);
        assert!(up.available);
        assert!(Protocol::ALL.iter().all(|p| up.check(*p) == CheckOutcome::NotApplicable));
    }
}
