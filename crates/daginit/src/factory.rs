use daginit_core::ProcessLifecycle;
use tracing::info;

/// Process backend selected at compile time
#[cfg(unix)]
pub type PlatformProcessManager = daginit_unix::UnixProcessManager;

/// Signal source selected at compile time
#[cfg(unix)]
pub type PlatformSignalSource = daginit_unix::UnixSignalSource;

#[cfg(not(unix))]
compile_error!("Unsupported platform: daginit only supports Unix targets");

/// Platform-independent factory for the process backend and signal source
pub struct PlatformFactory;

impl PlatformFactory {
    pub fn create_process_manager() -> PlatformProcessManager {
        let manager = daginit_unix::UnixProcessManagerFactory::create_process_manager();
        info!("Using {} process manager", manager.platform_name());
        manager
    }

    /// Registers the termination signal handlers
    pub fn install_signal_source() -> std::io::Result<PlatformSignalSource> {
        daginit_unix::UnixProcessManagerFactory::install_signal_source()
    }

    pub fn platform_name() -> &'static str {
        daginit_unix::UnixProcessManagerFactory::platform_name()
    }
}
