//! Run command - test every strategy and keep the best one

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use zst_core::state::SkipReason;
use zst_core::{
    rank, Config, ManagedPaths, ParallelScheduler, RestoreReport, ServiceControl, StateManager,
    StatusHandle, StrategyApplier, StrategyOrchestrator, StrategyOutcome, StrategyResult,
    StrategySet, TargetList,
};
use zst_platform::{resolve_firewall, SystemdService};

use super::FirewallArg;
use crate::args::Args as GlobalArgs;
use crate::report::{self, Line, Tone};
use crate::status_line;

/// Run command arguments
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Strategy list (JSON object: name -> config path)
    pub strategies: PathBuf,

    /// Target list (one host or IPv4 per line)
    pub hostlist: PathBuf,

    /// Number of concurrent probes
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Firewall backend written into FWTYPE=
    #[arg(long, value_enum)]
    pub firewall: Option<FirewallArg>,

    /// Apply the best strategy without asking
    #[arg(long)]
    pub auto_apply: bool,

    /// Probe every target even when a strategy cannot win
    #[arg(long)]
    pub no_smart_exit: bool,

    /// Host pinged to validate each strategy
    #[arg(long, value_name = "HOST")]
    pub reference_host: Option<String>,

    /// systemd unit running zapret
    #[arg(long, value_name = "UNIT")]
    pub service: Option<String>,

    /// Directory for the session log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Create RunArgs from the legacy positional invocation
    pub fn from_legacy(args: &GlobalArgs) -> Result<Self> {
        let (Some(strategies), Some(hostlist)) = (args.strategies.clone(), args.hostlist.clone())
        else {
            anyhow::bail!("usage: zst <STRATEGIES> <HOSTLIST> [-t N] (see `zst --help`)");
        };

        Ok(Self {
            strategies,
            hostlist,
            threads: args.threads,
            firewall: None,
            auto_apply: false,
            no_smart_exit: false,
            reference_host: None,
            service: None,
            log_dir: None,
        })
    }

    /// Fold command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.scheduler.workers = threads;
        }
        if let Some(firewall) = self.firewall {
            config.firewall.backend = firewall.into();
        }
        if self.no_smart_exit {
            config.scheduler.smart_exit = false;
        }
        if let Some(ref host) = self.reference_host {
            config.probe.reference_host = host.clone();
        }
        if let Some(ref service) = self.service {
            config.service.name = service.clone();
        }
        if let Some(ref dir) = self.log_dir {
            config.paths.log_dir = dir.clone();
        }
    }
}

/// What to do once testing is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Keep the strategy at this 0-based rank
    Apply(usize),
    /// Put the original configuration back
    Restore,
}

/// Interpret the operator's answer to the selection prompt
///
/// Empty input picks rank 1; `0`, out-of-range and non-numeric input restore.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim();
    if input.is_empty() {
        return if count > 0 { Choice::Apply(0) } else { Choice::Restore };
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Apply(n - 1),
        _ => Choice::Restore,
    }
}

/// Execute the run command
pub fn execute(args: RunArgs, config: Config, log_path: Option<&Path>) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let runtime = super::runtime()?;
    let result = runtime.block_on(session(args, config, log_path));
    // A pending prompt read must not keep the process alive
    runtime.shutdown_background();
    result
}

async fn session(args: RunArgs, config: Config, log_path: Option<&Path>) -> Result<()> {
    // Inputs are checked before the system is touched
    let strategies = StrategySet::load(&args.strategies)?;
    let targets = TargetList::load(&args.hostlist)?;

    // First interrupt stops testing, a second one leaves the selection prompt
    let cancel = CancellationToken::new();
    let prompt_cancel = CancellationToken::new();
    let (on_interrupt, on_prompt_interrupt) = (cancel.clone(), prompt_cancel.clone());
    ctrlc::set_handler(move || {
        if !on_interrupt.is_cancelled() {
            info!("Received interrupt signal, stopping...");
            on_interrupt.cancel();
        } else if !on_prompt_interrupt.is_cancelled() {
            info!("Received interrupt signal, restoring...");
            on_prompt_interrupt.cancel();
        } else {
            warn!("Already stopping, please wait for the restore to finish");
        }
    })
    .context("Failed to set signal handler")?;

    let backend = resolve_firewall(config.firewall.backend).await;
    let paths = ManagedPaths::from(&config.paths);
    let service: Arc<dyn ServiceControl> = Arc::new(SystemdService::new(&config.service.name));

    let state = StateManager::new(paths.clone(), service.clone());
    state
        .backup()
        .await
        .context("Failed to snapshot the current system state")?;

    let mut intro = vec![Line::of("zapret strategy testing", Tone::Frame)];
    if let Some(path) = log_path {
        intro.push(Line::of(format!("Log: {}", path.display()), Tone::Plain));
    }
    intro.push(Line::of(
        format!(
            "Strategies: {}, targets: {}, concurrent probes: {}",
            strategies.len(),
            targets.len(),
            config.scheduler.workers
        ),
        Tone::Plain,
    ));
    intro.push(Line::of(format!("Firewall: {backend}"), Tone::Plain));
    report::emit(&intro);

    let (status, status_rx) = StatusHandle::channel();
    let status_task = status_line::spawn(status_rx);

    let scheduler = ParallelScheduler::new(
        super::probe_runner(&config),
        config.scheduler.workers,
        config.scheduler.smart_exit(),
        status.clone(),
    );
    let applier = StrategyApplier::new(
        paths,
        &args.hostlist,
        backend,
        service,
        config.service.restart_delay(),
    );
    let reference_host = config.probe.reference_host.clone();
    let mut orchestrator = StrategyOrchestrator::new(
        applier,
        scheduler,
        reference_host.as_str(),
        config.scheduler.strategy_pause(),
        status,
    );

    let outcome = orchestrator
        .run_all(&strategies, &targets, &cancel, |result| {
            report::emit(&report::strategy_table(
                result,
                &reference_host,
                config.report.max_rows,
            ));
        })
        .await;

    if let Some(task) = status_task {
        task.abort();
    }
    status_line::clear();

    if outcome.interrupted {
        report::emit(&[Line::of("Testing interrupted by user", Tone::Bad)]);
    }

    // The strategy cut short by an interrupt is not a candidate
    let ranked: Vec<&StrategyResult> = rank(&outcome.results)
        .into_iter()
        .filter(|result| result.outcome != StrategyOutcome::Interrupted)
        .collect();

    if !ranked.is_empty() {
        report::emit(&report::summary_table(&ranked, config.report.top));

        let top: Vec<&StrategyResult> = ranked.into_iter().take(config.report.top).collect();
        let stop = if outcome.interrupted { &prompt_cancel } else { &cancel };
        let choice = select(top.len(), args.auto_apply, cancel.is_cancelled(), stop).await;
        if let Choice::Apply(index) = choice {
            keep(&orchestrator, &strategies, top[index], &state).await;
        }
    }

    finish(&state).await;
    Ok(())
}

/// Choice that needs no prompt, if any
///
/// `--auto-apply` only keeps a strategy from a session that was never
/// interrupted; an operator who pressed Ctrl-C gets the original state back
/// unless they pick a strategy themselves.
pub fn preselect(count: usize, auto_apply: bool, interrupted: bool, interactive: bool) -> Option<Choice> {
    if count == 0 {
        return Some(Choice::Restore);
    }
    if auto_apply {
        return Some(if interrupted {
            Choice::Restore
        } else {
            Choice::Apply(0)
        });
    }
    if !interactive {
        return Some(Choice::Restore);
    }
    None
}

async fn select(
    count: usize,
    auto_apply: bool,
    interrupted: bool,
    stop: &CancellationToken,
) -> Choice {
    let interactive = atty::is(atty::Stream::Stdin);
    if let Some(choice) = preselect(count, auto_apply, interrupted, interactive) {
        if choice == Choice::Restore && count > 0 {
            info!(auto_apply, interrupted, interactive, "Not keeping any strategy, restoring");
        }
        return choice;
    }

    report::emit(&[
        Line::default(),
        Line::of("Choose an action:", Tone::Header),
        Line::of(format!("  1-{count}"), Tone::Good).push(": apply strategy from the list", Tone::Plain),
        Line::of("  0", Tone::Bad).push(": exit and restore the original configuration", Tone::Plain),
    ]);
    print!("\nYour choice [1]: ");
    let _ = std::io::stdout().flush();

    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    });

    tokio::select! {
        biased;
        () = stop.cancelled() => Choice::Restore,
        answer = read => match answer {
            Ok(Ok(line)) => parse_choice(&line, count),
            _ => Choice::Restore,
        },
    }
}

async fn keep(
    orchestrator: &StrategyOrchestrator,
    strategies: &StrategySet,
    chosen: &StrategyResult,
    state: &StateManager,
) {
    let Some(strategy) = strategies.get(&chosen.name) else {
        error!(strategy = %chosen.name, "Selected strategy is not in the strategy list");
        return;
    };

    report::emit(&[Line::of(format!("Applying strategy: {}...", strategy.name), Tone::Warn)]);
    match orchestrator.applier().apply(strategy).await {
        Ok(()) => {
            state.commit();
            report::emit(&[Line::of("✓ Strategy applied", Tone::Good)]);
        }
        Err(e) => {
            error!(error = %e, "Failed to apply selected strategy");
            report::emit(&[Line::of(format!("✗ Failed to apply strategy: {e}"), Tone::Bad)]);
        }
    }
}

async fn finish(state: &StateManager) {
    match state.restore().await {
        RestoreReport::Restored => {
            report::emit(&[Line::of("Original configuration restored", Tone::Good)]);
        }
        RestoreReport::Partial(failures) => {
            let mut lines = vec![Line::of(
                "Restore incomplete: the system may still run the last tested strategy",
                Tone::Bad,
            )];
            lines.extend(
                failures
                    .iter()
                    .map(|failure| Line::of(format!("  {failure}"), Tone::Bad)),
            );
            report::emit(&lines);
        }
        RestoreReport::Skipped(SkipReason::Committed) => {
            info!("Selected strategy kept");
        }
        RestoreReport::Skipped(SkipReason::NoSnapshot) => {}
    }
}
