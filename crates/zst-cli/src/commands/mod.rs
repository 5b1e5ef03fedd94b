//! CLI commands

pub mod completions;
pub mod config;
pub mod probe;
pub mod run;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::sync::Arc;
use zst_core::config::FirewallSetting;
use zst_core::{Config, ProbeRunner};
use zst_platform::{CurlProber, SystemPinger};

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test every strategy and keep the best one (main command)
    Run(run::RunArgs),

    /// Probe targets through the current system state
    Probe(probe::ProbeArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Firewall backend choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FirewallArg {
    /// Detect from `iptables --version`
    Auto,
    /// Legacy iptables
    Iptables,
    /// nftables
    Nftables,
}

impl From<FirewallArg> for FirewallSetting {
    fn from(arg: FirewallArg) -> Self {
        match arg {
            FirewallArg::Auto => FirewallSetting::Auto,
            FirewallArg::Iptables => FirewallSetting::Iptables,
            FirewallArg::Nftables => FirewallSetting::Nftables,
        }
    }
}

/// Probe runner backed by the system `ping` and `curl`
pub(crate) fn probe_runner(config: &Config) -> ProbeRunner {
    ProbeRunner::new(
        Arc::new(SystemPinger::default()),
        Arc::new(CurlProber::default()),
        config.probe.timeouts(),
        config.probe.availability,
    )
}

/// Multi-threaded runtime for async commands
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
