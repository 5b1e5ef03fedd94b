//! zapret strategy tester CLI
//!
//! Finds the zapret strategy that unblocks the most targets on this host.

mod args;
mod commands;
mod logging;
mod report;
mod status_line;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::run::RunArgs;
use commands::Command;

fn main() -> Result<()> {
    // Parse command line arguments
    let mut args = Args::parse();
    let command = match args.command.take() {
        Some(command) => command,
        None => Command::Run(RunArgs::from_legacy(&args)?),
    };

    // Testing rewrites system files and restarts services
    if matches!(command, Command::Run(_)) {
        zst_platform::ensure_root()?;
    }

    let result = dispatch(&args, command);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn dispatch(args: &Args, command: Command) -> Result<()> {
    match command {
        Command::Run(run_args) => {
            let mut config = commands::config::load(args.config.as_deref())?;
            run_args.apply_overrides(&mut config);

            let guard = logging::init(args, Some(&config.paths.log_dir))?;
            if !args.quiet {
                print_banner();
            }
            commands::run::execute(run_args, config, guard.path.as_deref())
        }
        Command::Probe(probe_args) => {
            let config = commands::config::load(args.config.as_deref())?;
            let _guard = logging::init(args, None)?;
            if !args.quiet {
                print_banner();
            }
            commands::probe::execute(probe_args, config)
        }
        Command::Config(config_args) => {
            let _guard = logging::init(args, None)?;
            commands::config::execute(config_args)
        }
        Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}

fn print_banner() {
    use colored::Colorize;

    println!();
    println!("{}", "╔═══════════════════════════════════════════════════════╗".cyan());
    println!(
        "{}{}{}",
        "║  ".cyan(),
        format!("{:<53}", format!("zapret strategy tester v{}", env!("CARGO_PKG_VERSION")))
            .green()
            .bold(),
        "║".cyan()
    );
    println!(
        "{}{}{}",
        "║  ".cyan(),
        format!("{:<53}", "Strategy selection for zapret DPI bypass").white(),
        "║".cyan()
    );
    println!("{}", "╚═══════════════════════════════════════════════════════╝".cyan());
    println!();
}
