//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zst_core::Config;

const FILE_NAME: &str = "zst.toml";
const SYSTEM_PATH: &str = "/etc/zst/config.toml";

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with every default spelled out
    Generate {
        /// Output file path
        #[arg(short, long, default_value = FILE_NAME)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file.as_deref()),
        ConfigAction::Generate { output, force } => generate_config(&output, force),
        ConfigAction::Validate { file } => validate_config(&file),
        ConfigAction::Paths => show_paths(),
    }
}

/// Load the explicit config file, else the first one found, else defaults
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn show_config(file: Option<&Path>) -> Result<()> {
    let config = load(file)?;
    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{toml_str}");
    Ok(())
}

fn generate_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# zapret strategy tester configuration\n\
         # Every value below is the built-in default\n\n\
         {toml_str}"
    );

    std::fs::write(output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "Generated config file");
    println!("Configuration file generated: {}", output.display());
    Ok(())
}

fn validate_config(file: &Path) -> Result<()> {
    let config = Config::load(file)
        .with_context(|| format!("Failed to load config from {}", file.display()))?;

    config.validate().context("Configuration validation failed")?;

    println!("✓ Configuration is valid");
    println!("  Service: {}", config.service.name);
    println!("  Workers: {}", config.scheduler.workers);
    println!(
        "  Smart exit: {} (margin {:.0}%)",
        config.scheduler.smart_exit,
        config.scheduler.margin_ratio * 100.0
    );
    println!("  Reference host: {}", config.probe.reference_host);
    println!("  Firewall: {:?}", config.firewall.backend);

    Ok(())
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "zst").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    println!("  1. ./{FILE_NAME}");
    if let Some(path) = user_config_path() {
        println!("  2. {}", path.display());
    }
    println!("  3. {SYSTEM_PATH}");

    let defaults = Config::default();
    println!();
    println!("Managed files:");
    println!();
    println!("  zapret config: {}", defaults.paths.zapret_config.display());
    println!("  allow-list:    {}", defaults.paths.hostlist.display());
    println!("  session logs:  {}", defaults.paths.log_dir.display());

    Ok(())
}

fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from(FILE_NAME)];
    candidates.extend(user_config_path());
    candidates.push(PathBuf::from(SYSTEM_PATH));

    candidates.into_iter().find(|path| path.exists())
}
