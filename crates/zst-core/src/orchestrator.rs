//! Strategy evaluation loop
//!
//! Each strategy goes through `apply → baseline → probing → scored`. A
//! failed apply or baseline ends the strategy with score 0; it is still
//! recorded so every attempted strategy shows up in the summary.

use crate::apply::StrategyApplier;
use crate::error::Error;
use crate::probe::{Latency, ProbeResult};
use crate::scheduler::{ParallelScheduler, RunEnd};
use crate::status::{Phase, StatusHandle};
use crate::strategy::{Strategy, StrategySet};
use crate::target::{DomainTarget, TargetList};
use indexmap::IndexMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How a strategy's evaluation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Probing ran (possibly cut short by smart exit)
    Scored,
    /// The config could not be installed
    ApplyFailed(String),
    /// The reference host was unreachable after applying
    BaselineFailed,
    /// The operator interrupted the session during this strategy
    Interrupted,
}

/// Evaluation record of one strategy
#[derive(Debug, Clone)]
pub struct StrategyResult {
    /// Strategy name
    pub name: String,
    /// Completed probes in target-list order
    pub results: IndexMap<DomainTarget, ProbeResult>,
    /// Reference host latency
    pub baseline: Latency,
    /// Targets in the list
    pub total: usize,
    /// Probes that finished
    pub completed: usize,
    /// Available targets (the score)
    pub available: usize,
    /// Probing stopped before every target finished
    pub aborted: bool,
    /// How the evaluation ended
    pub outcome: StrategyOutcome,
}

impl StrategyResult {
    fn unscored(name: &str, total: usize, baseline: Latency, outcome: StrategyOutcome) -> Self {
        Self {
            name: name.to_string(),
            results: IndexMap::new(),
            baseline,
            total,
            completed: 0,
            available: 0,
            aborted: false,
            outcome,
        }
    }

    /// Available share of the target list in percent
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.available as f64 * 100.0 / self.total as f64
        }
    }

    /// Whether this result may raise the best score
    pub fn is_complete(&self) -> bool {
        self.outcome == StrategyOutcome::Scored && !self.aborted
    }
}

/// Everything a session produced
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Results in test order
    pub results: Vec<StrategyResult>,
    /// The session was interrupted; later strategies were not attempted
    pub interrupted: bool,
}

/// Drives strategies through evaluation one at a time
#[derive(Debug)]
pub struct StrategyOrchestrator {
    applier: StrategyApplier,
    scheduler: ParallelScheduler,
    reference_host: String,
    pause: Duration,
    status: StatusHandle,
    best_score: usize,
}

impl StrategyOrchestrator {
    /// Create an orchestrator
    pub fn new(
        applier: StrategyApplier,
        scheduler: ParallelScheduler,
        reference_host: impl Into<String>,
        pause: Duration,
        status: StatusHandle,
    ) -> Self {
        Self {
            applier,
            scheduler,
            reference_host: reference_host.into(),
            pause,
            status,
            best_score: 0,
        }
    }

    /// Highest score of any fully evaluated strategy so far
    pub fn best_score(&self) -> usize {
        self.best_score
    }

    /// The applier, for re-applying the selected strategy
    pub fn applier(&self) -> &StrategyApplier {
        &self.applier
    }

    /// Evaluate every strategy in order
    ///
    /// `on_result` sees each record as soon as it is final.
    pub async fn run_all<F>(
        &mut self,
        strategies: &StrategySet,
        targets: &TargetList,
        cancel: &CancellationToken,
        mut on_result: F,
    ) -> SessionReport
    where
        F: FnMut(&StrategyResult),
    {
        let mut report = SessionReport::default();

        for (index, strategy) in strategies.iter().enumerate() {
            info!(
                strategy = %strategy.name,
                "[{}/{}] Testing strategy",
                index + 1,
                strategies.len()
            );

            let paused = tokio::select! {
                biased;
                () = cancel.cancelled() => false,
                () = tokio::time::sleep(self.pause) => true,
            };
            if !paused {
                report.interrupted = true;
                break;
            }

            let result = self.run_strategy(strategy, targets, cancel).await;
            on_result(&result);
            let interrupted = result.outcome == StrategyOutcome::Interrupted;
            report.results.push(result);

            if interrupted {
                report.interrupted = true;
                break;
            }
        }

        self.status.clear();
        report
    }

    /// Evaluate a single strategy
    pub async fn run_strategy(
        &mut self,
        strategy: &Strategy,
        targets: &TargetList,
        cancel: &CancellationToken,
    ) -> StrategyResult {
        let name = strategy.name.as_str();
        let total = targets.len();

        self.status.update(name, Phase::Applying, "", 0, total);
        if let Err(e) = self.applier.apply(strategy).await {
            warn!(strategy = name, error = %e, "Skipping strategy");
            return StrategyResult::unscored(
                name,
                total,
                Latency::Failed,
                StrategyOutcome::ApplyFailed(e.to_string()),
            );
        }
        if cancel.is_cancelled() {
            return StrategyResult::unscored(name, total, Latency::Failed, StrategyOutcome::Interrupted);
        }

        self.status
            .update(name, Phase::Baseline, &self.reference_host, 0, total);
        let baseline = self.scheduler.runner().ping(&self.reference_host).await;
        if !baseline.is_ok() {
            let e = Error::BaselineUnreachable {
                host: self.reference_host.clone(),
            };
            warn!(strategy = name, error = %e, "Skipping strategy");
            return StrategyResult::unscored(name, total, baseline, StrategyOutcome::BaselineFailed);
        }
        info!(strategy = name, %baseline, "Baseline latency");

        let run = self
            .scheduler
            .run(name, targets, self.best_score, cancel)
            .await;

        let (aborted, outcome) = match run.end {
            RunEnd::Completed => (false, StrategyOutcome::Scored),
            RunEnd::Aborted => (true, StrategyOutcome::Scored),
            RunEnd::Interrupted => (true, StrategyOutcome::Interrupted),
        };

        let result = StrategyResult {
            name: name.to_string(),
            results: run.results,
            baseline,
            total: run.total,
            completed: run.completed,
            available: run.available,
            aborted,
            outcome,
        };

        if result.is_complete() && result.available > self.best_score {
            self.best_score = result.available;
        }
        if !aborted {
            self.status.update(name, Phase::Done, "", run.completed, run.total);
        }

        info!(
            strategy = name,
            available = result.available,
            total = result.total,
            aborted,
            "Strategy finished: {}/{} ({:.1}%)",
            result.available,
            result.total,
            result.success_rate()
        );
        result
    }
}
