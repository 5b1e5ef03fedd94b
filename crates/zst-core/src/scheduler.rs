//! Parallel probing of a target list
//!
//! The [`ParallelScheduler`] fans a strategy's probes out over a worker pool
//! shared by the whole session, harvests them in completion order and stops
//! early when the strategy can no longer compete with the best one seen so
//! far (see [`SmartExit`]) or when the operator interrupts the session.

use crate::error::Error;
use crate::probe::{ProbeResult, ProbeRunner};
use crate::status::{Phase, StatusHandle};
use crate::target::{DomainTarget, TargetList};
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Early-abort ("smart exit") rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmartExit {
    /// Disabled rules never abort
    pub enabled: bool,
    /// Share of the target count a strategy may trail the best score by
    pub margin_ratio: f64,
}

impl Default for SmartExit {
    fn default() -> Self {
        Self {
            enabled: true,
            margin_ratio: 0.2,
        }
    }
}

impl SmartExit {
    /// `floor(margin_ratio * total)`
    pub fn margin(&self, total: usize) -> usize {
        (self.margin_ratio * total as f64).floor() as usize
    }

    /// Whether a run with `available` of `completed` out of `total` done can
    /// no longer come within the margin of `best_score`
    pub fn should_abort(
        &self,
        best_score: usize,
        total: usize,
        completed: usize,
        available: usize,
    ) -> bool {
        if !self.enabled || best_score == 0 {
            return false;
        }
        let remaining = total.saturating_sub(completed);
        let max_possible = (available + remaining) as i64;
        let threshold = best_score as i64 - self.margin(total) as i64;
        max_possible < threshold
    }
}

/// How a scheduled run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Every target was probed
    Completed,
    /// Smart exit fired
    Aborted,
    /// The session was cancelled
    Interrupted,
}

/// Results of one scheduled run
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    /// Completed probes in target-list order, first occurrence wins
    pub results: IndexMap<DomainTarget, ProbeResult>,
    /// Targets in the list
    pub total: usize,
    /// Probes that finished before the run ended
    pub completed: usize,
    /// Finished probes that were available
    pub available: usize,
    /// How the run ended
    pub end: RunEnd,
}

/// Fans probes out over a bounded worker pool
#[derive(Debug, Clone)]
pub struct ParallelScheduler {
    runner: ProbeRunner,
    workers: Arc<Semaphore>,
    smart_exit: SmartExit,
    status: StatusHandle,
}

impl ParallelScheduler {
    /// Create a scheduler with its own pool of `workers` permits
    pub fn new(runner: ProbeRunner, workers: usize, smart_exit: SmartExit, status: StatusHandle) -> Self {
        Self {
            runner,
            workers: Arc::new(Semaphore::new(workers.max(1))),
            smart_exit,
            status,
        }
    }

    /// The probe runner used for every target
    pub fn runner(&self) -> &ProbeRunner {
        &self.runner
    }

    /// Probe every target for `strategy`
    ///
    /// `best_score` is the best available-count of any fully evaluated
    /// strategy so far; it drives the smart exit rule.
    pub async fn run(
        &self,
        strategy: &str,
        targets: &TargetList,
        best_score: usize,
        cancel: &CancellationToken,
    ) -> ScheduleOutcome {
        let total = targets.len();
        let mut slots: Vec<Option<ProbeResult>> = vec![None; total];
        let mut completed = 0;
        let mut available = 0;
        let mut end = RunEnd::Completed;

        let mut set = JoinSet::new();
        for (index, target) in targets.iter().enumerate() {
            let runner = self.runner.clone();
            let workers = self.workers.clone();
            let target = target.clone();
            set.spawn(async move {
                // Closed pool means the session is shutting down
                let _permit = workers.acquire_owned().await.ok()?;
                Some((index, runner.probe(&target).await))
            });
        }

        self.status.update(strategy, Phase::Probing, "", 0, total);

        while !set.is_empty() {
            let joined = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    end = RunEnd::Interrupted;
                    break;
                }
                joined = set.join_next() => joined,
            };

            let Some(joined) = joined else { break };
            completed += 1;

            match joined {
                Ok(Some((index, result))) => {
                    if result.available {
                        available += 1;
                    }
                    let target = targets.get(index).map(DomainTarget::as_str).unwrap_or_default();
                    debug!(strategy, target, available = result.available, "Probe finished");
                    self.status.update(strategy, Phase::Probing, target, completed, total);
                    slots[index] = Some(result);
                }
                Ok(None) => debug!(strategy, "Probe skipped, worker pool closed"),
                Err(e) => error!(strategy, error = %e, "Probe task failed"),
            }

            if self.smart_exit.should_abort(best_score, total, completed, available) {
                info!(
                    strategy,
                    completed,
                    available,
                    best_score,
                    reason = %Error::AbortedEarly,
                    "Stopping strategy"
                );
                self.status.update(strategy, Phase::Aborted, "", completed, total);
                end = RunEnd::Aborted;
                break;
            }
        }

        // Dropping the futures of unfinished probes kills their processes
        set.abort_all();
        drop(set);

        let mut results = IndexMap::with_capacity(completed);
        for (target, slot) in targets.iter().zip(slots) {
            if let Some(result) = slot {
                results.entry(target.clone()).or_insert(result);
            }
        }

        ScheduleOutcome {
            results,
            total,
            completed,
            available,
            end,
        }
    }
}
