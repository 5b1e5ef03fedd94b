//! Configuration management for the strategy tester
//!
//! Provides a strongly-typed configuration system with TOML support.
//! Every section has defaults matching a stock zapret installation, so an
//! empty file (or no file at all) is a valid configuration.

use crate::apply::FirewallBackend;
use crate::error::{Error, Result};
use crate::probe::{AvailabilityPolicy, ProbeTimeouts};
use crate::scheduler::SmartExit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locations of the files mutated during a session
    pub paths: PathsConfig,

    /// Managed service settings
    pub service: ServiceConfig,

    /// Probe timeouts and availability rule
    pub probe: ProbeConfig,

    /// Worker pool and smart exit
    pub scheduler: SchedulerConfig,

    /// Firewall backend selection
    pub firewall: FirewallConfig,

    /// Result table settings
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(Error::config_value("service.name", "Must not be empty"));
        }

        if self.probe.ping_timeout_ms == 0 {
            return Err(Error::config_value("probe.ping_timeout_ms", "Must be greater than 0"));
        }
        if self.probe.check_timeout_ms == 0 {
            return Err(Error::config_value("probe.check_timeout_ms", "Must be greater than 0"));
        }
        if self.probe.reference_host.trim().is_empty() {
            return Err(Error::config_value("probe.reference_host", "Must not be empty"));
        }

        if self.scheduler.workers == 0 {
            return Err(Error::config_value("scheduler.workers", "Must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.scheduler.margin_ratio) {
            return Err(Error::config_value(
                "scheduler.margin_ratio",
                "Must be between 0.0 and 1.0",
            ));
        }

        if self.report.top == 0 {
            return Err(Error::config_value("report.top", "Must be greater than 0"));
        }

        Ok(())
    }
}

/// Paths of the zapret installation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Live zapret config file, overwritten per strategy
    pub zapret_config: PathBuf,
    /// Live host allow-list, overwritten per strategy
    pub hostlist: PathBuf,
    /// Directory receiving the session log
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            zapret_config: PathBuf::from("/opt/zapret/config"),
            hostlist: PathBuf::from("/opt/zapret/ipset/zapret-hosts-user.txt"),
            log_dir: PathBuf::from("/tmp"),
        }
    }
}

/// Managed service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// systemd unit name
    pub name: String,
    /// Settle time after a restart (milliseconds)
    pub restart_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "zapret".to_string(),
            restart_delay_ms: 1000,
        }
    }
}

impl ServiceConfig {
    /// Settle time after a restart
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// ICMP echo timeout (milliseconds)
    pub ping_timeout_ms: u64,
    /// HTTP / TLS check timeout (milliseconds)
    pub check_timeout_ms: u64,
    /// Extra wall-clock allowance before a check is killed (milliseconds)
    pub grace_ms: u64,
    /// Host pinged before each strategy as a network sanity check
    pub reference_host: String,
    /// Which checks make a hostname count as available
    pub availability: AvailabilityPolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: 1500,
            check_timeout_ms: 3000,
            grace_ms: 500,
            reference_host: "google.com".to_string(),
            availability: AvailabilityPolicy::TlsRequired,
        }
    }
}

impl ProbeConfig {
    /// Timeout budgets for the probe runner
    pub fn timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            ping: Duration::from_millis(self.ping_timeout_ms),
            check: Duration::from_millis(self.check_timeout_ms),
            grace: Duration::from_millis(self.grace_ms),
        }
    }
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Size of the session-wide worker pool
    pub workers: usize,
    /// Enable early abort of non-competitive strategies
    pub smart_exit: bool,
    /// Share of the target count a strategy may fall behind the best one
    pub margin_ratio: f64,
    /// Pause before each strategy (milliseconds)
    pub strategy_pause_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 500,
            smart_exit: true,
            margin_ratio: 0.2,
            strategy_pause_ms: 500,
        }
    }
}

impl SchedulerConfig {
    /// Early abort rule derived from this section
    pub fn smart_exit(&self) -> SmartExit {
        SmartExit {
            enabled: self.smart_exit,
            margin_ratio: self.margin_ratio,
        }
    }

    /// Pause before each strategy
    pub fn strategy_pause(&self) -> Duration {
        Duration::from_millis(self.strategy_pause_ms)
    }
}

/// Firewall backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallSetting {
    /// Detect from `iptables --version`
    #[default]
    Auto,
    /// Force the iptables backend
    Iptables,
    /// Force the nftables backend
    Nftables,
}

impl FirewallSetting {
    /// The backend to use without detection, if one is forced
    pub fn forced(self) -> Option<FirewallBackend> {
        match self {
            Self::Auto => None,
            Self::Iptables => Some(FirewallBackend::Iptables),
            Self::Nftables => Some(FirewallBackend::Nftables),
        }
    }
}

/// Firewall configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Backend written into `FWTYPE=`
    pub backend: FirewallSetting,
}

/// Result table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of strategies shown and selectable in the summary
    pub top: usize,
    /// Per-strategy tables longer than this are elided
    pub max_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: 10, max_rows: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========== Default Config Tests ===========

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.name, "zapret");
        assert_eq!(config.scheduler.workers, 500);
        assert_eq!(config.probe.reference_host, "google.com");
        assert_eq!(config.probe.availability, AvailabilityPolicy::TlsRequired);
        assert_eq!(config.firewall.backend, FirewallSetting::Auto);
    }

    #[test]
    fn test_default_paths() {
        let paths = PathsConfig::default();
        assert_eq!(paths.zapret_config, PathBuf::from("/opt/zapret/config"));
        assert_eq!(
            paths.hostlist,
            PathBuf::from("/opt/zapret/ipset/zapret-hosts-user.txt")
        );
    }

    #[test]
    fn test_probe_timeouts() {
        let timeouts = ProbeConfig::default().timeouts();
        assert_eq!(timeouts.ping, Duration::from_millis(1500));
        assert_eq!(timeouts.check, Duration::from_secs(3));
        assert_eq!(timeouts.grace, Duration::from_millis(500));
    }

    // =========== Validation Tests ===========

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_workers() {
        let mut config = Config::default();
        config.scheduler.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_margin_ratio() {
        let mut config = Config::default();
        config.scheduler.margin_ratio = 1.5;
        assert!(config.validate().is_err());

        config.scheduler.margin_ratio = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_service() {
        let mut config = Config::default();
        config.service.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = Config::default();
        config.probe.check_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    // =========== TOML Tests ===========

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.scheduler.workers, parsed.scheduler.workers);
        assert_eq!(config.paths.hostlist, parsed.paths.hostlist);
    }

    #[test]
    fn test_toml_parse_minimal() {
        let toml_content = r#"
[service]
name = "zapret2"

[probe]
availability = "any"

[firewall]
backend = "iptables"
"#;
        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.service.name, "zapret2");
        assert_eq!(config.service.restart_delay_ms, 1000);
        assert_eq!(config.probe.availability, AvailabilityPolicy::Any);
        assert_eq!(config.firewall.backend, FirewallSetting::Iptables);
    }

    #[test]
    fn test_toml_parse_invalid() {
        assert!(Config::from_toml("this is not [valid toml").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        match Config::load("/nonexistent/zst.toml") {
            Err(Error::ConfigNotFound { path }) => assert!(path.contains("zst.toml")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
