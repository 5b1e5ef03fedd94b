//! # zapret strategy tester core
//!
//! Platform-independent engine that evaluates zapret DPI-circumvention
//! strategies against a list of targets.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Probing** - per-target ping and HTTP/TLS checks ([`ProbeRunner`])
//! - **Scheduling** - bounded parallel probing with early abort ([`ParallelScheduler`])
//! - **Rollback** - system snapshot and restore ([`StateManager`])
//! - **Orchestration** - the per-strategy evaluation loop ([`StrategyOrchestrator`])
//! - **Ranking** - ordering strategies for the final summary
//!
//! Network checks and service control are reached through traits
//! ([`Pinger`], [`HttpProber`], [`ServiceControl`]); `zst-platform` provides
//! the Linux implementations.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zst_core::{Config, StrategySet, TargetList};
//!
//! let config = Config::load("zst.toml")?;
//! let strategies = StrategySet::load("strategies.json")?;
//! let targets = TargetList::load("hosts.txt")?;
//! println!("{} strategies x {} targets", strategies.len(), targets.len());
//! # Ok::<(), zst_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod apply;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod ranking;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod status;
pub mod strategy;
pub mod target;

// Re-exports for convenience
pub use apply::{FirewallBackend, StrategyApplier};
pub use config::Config;
pub use error::{Error, ProbeError, Result};
pub use orchestrator::{SessionReport, StrategyOrchestrator, StrategyOutcome, StrategyResult};
pub use probe::{
    AvailabilityPolicy, CheckOutcome, HttpProber, Latency, Pinger, ProbeResult, ProbeRunner,
    ProbeTimeouts, Protocol,
};
pub use ranking::{rank, Rating};
pub use scheduler::{ParallelScheduler, RunEnd, ScheduleOutcome, SmartExit};
pub use service::ServiceControl;
pub use state::{ManagedPaths, RestoreReport, StateManager, SystemSnapshot};
pub use status::{Phase, Status, StatusHandle};
pub use strategy::{Strategy, StrategySet};
pub use target::{DomainTarget, TargetList};
