//! Binary entry point for watchsweep.
//!
//! Loads configuration (env, optional TOML file, CLI flags), verifies
//! credentials before any work, runs the cleanup, and maps the outcome to
//! the process exit code: failure when configuration is incomplete or when
//! a live run had item-level deletion failures.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in the binary for pre-logging failures
#![allow(clippy::print_stderr)]

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use watchsweep::clients::{JellyfinClient, RadarrClient, SonarrClient};
use watchsweep::observability::{self, LogFormat, LoggingConfig};
use watchsweep::{CleanupRunner, MediaMapper, SweepConfig};

/// Watchsweep - deletes watched media through the catalog services' APIs.
#[derive(Parser)]
#[command(name = "watchsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Perform deletions instead of the default dry run.
    #[arg(long)]
    execute: bool,

    /// Force a dry run even if the environment enables live mode.
    #[arg(long, conflicts_with = "execute")]
    dry_run: bool,

    /// Grace period in days since last playback.
    #[arg(long)]
    grace_days: Option<u32>,

    /// Media-server user whose watch state drives the run.
    #[arg(long)]
    user: Option<String>,

    /// Tag label that exempts items from deletion.
    #[arg(long)]
    keep_tag: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Log format: pretty or json.
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Log file, in addition to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Applies CLI overrides on top of the loaded configuration.
    fn apply(&self, mut config: SweepConfig) -> SweepConfig {
        if self.execute {
            config.dry_run = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(days) = self.grace_days {
            config.grace_period_days = days;
        }
        if let Some(user) = &self.user {
            config.primary_user = user.clone();
        }
        if let Some(label) = &self.keep_tag {
            config.keep_tag_label = label.clone();
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    // Load .env if present; ignore absence.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match SweepConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("watchsweep: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => SweepConfig::load_default(),
    };
    let config = cli.apply(config);

    if let Err(e) = observability::init(&LoggingConfig {
        format: LogFormat::parse(&cli.log_format),
        verbose: cli.verbose,
        file: config.log_file.clone(),
    }) {
        eprintln!("watchsweep: {e}");
        return ExitCode::FAILURE;
    }

    // Credential preflight: fail before any collaborator is contacted.
    if let Err(e) = config.validate_credentials() {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let mapper = MediaMapper::new(
        RadarrClient::new(&config.radarr.base_url, &config.radarr.api_key),
        SonarrClient::new(&config.sonarr.base_url, &config.sonarr.api_key),
        config.prefixes.clone(),
    );
    let jellyfin = JellyfinClient::new(&config.jellyfin.base_url, &config.jellyfin.api_key);
    let mut runner = CleanupRunner::new(jellyfin, mapper, &config);

    match runner.run() {
        Ok(stats) => {
            tracing::info!(
                deleted = stats.total_deleted(),
                dry_run = stats.dry_run,
                "Media cleanup complete"
            );
            if !stats.dry_run && stats.has_failures() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Cleanup failed: {e}");
            ExitCode::FAILURE
        }
    }
}
