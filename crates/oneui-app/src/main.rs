//! OneUI app host process
//!
//! Bootstraps the crash logging subsystem the way the application class
//! does at startup:
//! - initialise tracing
//! - load and validate configuration
//! - install the crash logger (exactly once)
//! - prune old crash logs and print the status report

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use oneui_core::Config;
use oneui_telemetry::{CrashLogStore, CrashLogger};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "oneuiapp", version, about = "OneUI app crash logging host")]
struct Cli {
    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Pick the tracing filter: `-v` flags win over the configured level.
fn filter_level(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Load the config file, falling back to defaults when it is missing or invalid.
fn load_config(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path);

    let errors = config.validate();
    if errors.is_empty() {
        config
    } else {
        for error in &errors {
            eprintln!("Invalid configuration: {error}");
        }
        Config::default()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_level(cli.verbose, &config.logging.level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!("OneUI app starting");

    let logger = Arc::new(
        CrashLogger::new(&config.crash_logs).with_version(env!("CARGO_PKG_VERSION")),
    );
    if !logger.install() {
        warn!("Crash logger was already installed");
    }

    let store = CrashLogStore::from_config(&config.crash_logs);
    let removed = store.cleanup();
    info!(removed, "Crash log cleanup finished");

    print!("{}", store.status_report());
    Ok(())
}
