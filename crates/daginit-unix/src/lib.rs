//! Unix backend for daginit: tokio process spawning and SIGINT/SIGTERM delivery

mod unix_process_manager;

#[cfg(unix)]
mod signals;

#[cfg(unix)]
pub use signals::{UnixSignalSource, termination_signal};
#[cfg(unix)]
pub use unix_process_manager::{UnixProcessHandle, UnixProcessManager};

pub struct UnixProcessManagerFactory;

#[cfg(unix)]
impl UnixProcessManagerFactory {
    pub fn create_process_manager() -> UnixProcessManager {
        UnixProcessManager::new()
    }

    pub fn install_signal_source() -> std::io::Result<UnixSignalSource> {
        UnixSignalSource::install()
    }

    pub fn platform_name() -> &'static str {
        "Unix"
    }
}
