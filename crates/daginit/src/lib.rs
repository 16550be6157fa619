//! daginit - init supervisor for an Elixir release
//!
//! Resolves the configuration, opens the output targets, boots the release
//! and kills it when SIGINT or SIGTERM arrives.

mod factory;

pub use daginit_core::*;
pub use factory::{PlatformFactory, PlatformProcessManager, PlatformSignalSource};

use std::path::Path;
use tracing::info;

/// Runs the supervisor with the `DAGINIT_*` variables of the current process
pub async fn boot(config_path: Option<&Path>) -> Result<ExitReason, DaginitError> {
    boot_with_env(config_path, EnvSnapshot::capture()).await
}

/// Runs the supervisor against an explicit environment snapshot
pub async fn boot_with_env(
    config_path: Option<&Path>,
    env: EnvSnapshot,
) -> Result<ExitReason, DaginitError> {
    let spec = ConfigurationResolver::new(env).resolve(config_path)?;
    info!("daginit configuration loaded");

    let paths = ReleasePaths::from_spec(&spec);
    let targets = StreamRedirector::open(&spec, &paths)?;
    let signals = PlatformFactory::install_signal_source().map_err(DaginitError::Signal)?;

    let command = LaunchCommand::new(&spec, &paths);
    let manager = PlatformFactory::create_process_manager();

    Supervisor::new(spec.release_root.clone(), targets)
        .run(&manager, &command, signals, spec.verbose)
        .await
}
