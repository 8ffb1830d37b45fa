//! Command-line interface for breadcrumbs
//!
//! Every subcommand loads the configuration file (if any), applies the
//! override flags from [`overrides::OverrideArgs`] and drives a
//! [`Provisioner`]:
//!
//! - `config` prints the validated configuration as JSON
//! - `manifest` prints the manifest as JSON
//! - `create` writes the breadcrumbs directory and prints its path
//! - `provision` probes this machine, writes the breadcrumbs and copies them
//!   under `--target-root`
//!
//! ```bash
//! breadcrumbs --template centos7.json --suffix .ks --suffix .sh manifest
//! breadcrumbs --config breadcrumbs.toml create --output ./crumbs
//! BREADCRUMBS_CONFIG=breadcrumbs.toml breadcrumbs provision --target-root /
//! ```

pub mod overrides;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::PluginConfig;
use crate::constants::LOG_TARGETS;
use crate::probe::LocalShell;
use crate::provisioner::{LocalDirectoryUpload, PrepareOutcome, Provisioner};
use overrides::OverrideArgs;

/// Records a Packer build's template and referenced files.
#[derive(Parser, Debug)]
#[command(
    name = "breadcrumbs",
    about = "Capture a Packer template and the files it references",
    version,
    long_about = "Scans a Packer template for file references, resolves template variables, \
                  and writes a hashed, size-limited copy of everything it finds next to a \
                  breadcrumbs.json manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print command output and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "BREADCRUMBS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the validated configuration as JSON
    Config,

    /// Print the manifest that would be recorded, as JSON
    Manifest,

    /// Write the breadcrumbs directory and print its path
    Create {
        /// Output directory (defaults to the artifacts directory or a new temporary one)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Probe this machine and install the breadcrumbs under a root directory
    Provision {
        /// Directory standing in for the target's filesystem root
        #[arg(long, value_name = "DIR", default_value = "/")]
        target_root: PathBuf,
    },
}

impl Cli {
    /// Initializes logging and runs the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns any configuration, manifest, materialization or upload error.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let mut config = PluginConfig::load_with_optional(self.config.as_deref()).await?;
        config.apply_overrides(self.overrides.into());

        match self.command {
            Commands::Config => {
                select_debug_mode(&mut config, DebugMode::Config);
                run_debug(config).await
            }
            Commands::Manifest => {
                select_debug_mode(&mut config, DebugMode::Manifest);
                run_debug(config).await
            }
            Commands::Create {
                output,
            } => {
                if output.is_some() {
                    config.artifacts_dir_path = output;
                }
                select_debug_mode(&mut config, DebugMode::Breadcrumbs);
                run_debug(config).await
            }
            Commands::Provision {
                target_root,
            } => {
                select_debug_mode(&mut config, DebugMode::None);
                let mut provisioner = Provisioner::new(config);
                match provisioner.prepare().await? {
                    PrepareOutcome::Ready => {}
                    other => {
                        print_outcome(other);
                        return Ok(());
                    }
                }

                provisioner.provision(&LocalShell, &LocalDirectoryUpload::new(target_root.clone())).await?;
                eprintln!(
                    "{} Breadcrumbs installed under {}",
                    "✓".green(),
                    target_root.join(provisioner.config().upload_dir_path.trim_start_matches('/')).display()
                );
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugMode {
    None,
    Config,
    Manifest,
    Breadcrumbs,
}

/// Leaves exactly the debug mode of the subcommand enabled.
fn select_debug_mode(config: &mut PluginConfig, mode: DebugMode) {
    config.debug_config = mode == DebugMode::Config;
    config.debug_manifest = mode == DebugMode::Manifest;
    config.debug_breadcrumbs = mode == DebugMode::Breadcrumbs;
}

async fn run_debug(config: PluginConfig) -> Result<()> {
    let mut provisioner = Provisioner::new(config);
    let outcome = provisioner.prepare().await?;
    print_outcome(outcome);
    Ok(())
}

fn print_outcome(outcome: PrepareOutcome) {
    match outcome {
        PrepareOutcome::Ready => {}
        PrepareOutcome::Config(json) | PrepareOutcome::Manifest(json) => print!("{json}"),
        PrepareOutcome::Breadcrumbs(path) => println!("{}", path.display()),
    }
}

/// Filter enabling `level` for this crate's modules and its pipeline log targets.
///
/// Other crates (reqwest, hyper) stay silent.
#[must_use]
pub fn log_filter(level: Level) -> EnvFilter {
    let directives: Vec<String> = std::iter::once("breadcrumbs_cli")
        .chain(LOG_TARGETS.iter().copied())
        .map(|target| format!("{target}={level}"))
        .collect();
    EnvFilter::new(directives.join(","))
}

/// Installs the global subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("off")
        } else if verbose {
            log_filter(Level::DEBUG)
        } else {
            log_filter(Level::INFO)
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
