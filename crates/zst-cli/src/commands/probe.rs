//! Probe command - check targets through whatever the system runs now

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zst_core::{
    Config, ParallelScheduler, RunEnd, SmartExit, StatusHandle, StrategyOutcome, StrategyResult, TargetList,
};

use crate::report;

/// Probe command arguments
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Target list (one host or IPv4 per line)
    pub hostlist: PathBuf,

    /// Number of concurrent probes
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Show every row instead of eliding long tables
    #[arg(long)]
    pub all: bool,
}

/// Execute the probe command
pub fn execute(args: ProbeArgs, mut config: Config) -> Result<()> {
    if let Some(threads) = args.threads {
        config.scheduler.workers = threads;
    }
    config.validate()?;

    let targets = TargetList::load(&args.hostlist)?;
    let runtime = super::runtime()?;
    runtime.block_on(async {
        let runner = super::probe_runner(&config);
        let baseline = runner.ping(&config.probe.reference_host).await;

        let scheduler = ParallelScheduler::new(
            runner,
            config.scheduler.workers,
            SmartExit {
                enabled: false,
                ..SmartExit::default()
            },
            StatusHandle::disabled(),
        );

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        ctrlc::set_handler(move || on_interrupt.cancel()).context("Failed to set signal handler")?;

        info!(targets = targets.len(), "Probing current system");
        let run = scheduler.run("current", &targets, 0, &cancel).await;

        let result = StrategyResult {
            name: "current system".to_string(),
            results: run.results,
            baseline,
            total: run.total,
            completed: run.completed,
            available: run.available,
            aborted: !matches!(run.end, RunEnd::Completed),
            outcome: match run.end {
                RunEnd::Interrupted => StrategyOutcome::Interrupted,
                _ => StrategyOutcome::Scored,
            },
        };

        let max_rows = if args.all { usize::MAX } else { config.report.max_rows };
        report::emit(&report::strategy_table(
            &result,
            &config.probe.reference_host,
            max_rows,
        ));
        Ok::<_, anyhow::Error>(())
    })
}
