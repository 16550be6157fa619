use crate::launch::LaunchCommand;
use crate::stdio::RedirectionTargets;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Unique identifier for a process
pub type ProcessId = u32;

/// Status of a process after termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Process exited normally with the given exit code
    Exited { code: i32 },
    /// Process was terminated by the given signal number
    Signaled { signal: i32 },
    /// Process status is unknown
    Unknown,
}

impl ProcessStatus {
    /// Shell-style exit code: the code itself, or `128 + signal`
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessStatus::Exited { code } => *code,
            ProcessStatus::Signaled { signal } => 128 + signal,
            ProcessStatus::Unknown => 1,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Exited { code } => write!(f, "exit code {code}"),
            ProcessStatus::Signaled { signal } => write!(f, "signal {signal}"),
            ProcessStatus::Unknown => write!(f, "unknown status"),
        }
    }
}

/// Result of a kill request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationResult {
    /// Kill was requested
    Success,
    /// A kill had already been requested earlier
    AlreadyRequested,
    /// Process was not found (already exited)
    ProcessNotFound,
}

/// External events that end a supervisor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TerminationSignal {
    #[display("SIGINT")]
    Interrupt,
    #[display("SIGTERM")]
    Terminate,
}

/// Handle to the launched release
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None if unknown)
    fn get_pid(&self) -> Option<ProcessId>;

    /// Wait for the process to exit. Cancel-safe: it may be polled again
    /// after being dropped mid-wait.
    async fn wait(&mut self) -> Result<ProcessStatus>;

    /// Request forceful termination. Safe to call while a wait is pending;
    /// only the first request has an effect.
    fn kill(&self) -> TerminationResult;
}

/// Backend that starts the release with its streams attached
#[async_trait]
pub trait ProcessLifecycle: Send + Sync {
    /// The type of process handle this lifecycle manager produces
    type Handle: ProcessHandle;

    /// Spawn `command` with exactly its own environment, stdin detached and
    /// stdout/stderr bound to `targets`
    async fn spawn_process(
        &self,
        command: &LaunchCommand,
        targets: &RedirectionTargets,
    ) -> Result<Self::Handle>;

    /// Get the platform name for logging and debugging
    fn platform_name(&self) -> &'static str;
}

/// Source of termination signals delivered to the supervisor
#[async_trait]
pub trait SignalSource: Send {
    /// Next termination signal. `None` once the source can deliver no more.
    async fn recv(&mut self) -> Option<TerminationSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        assert_eq!(ProcessStatus::Exited { code: 0 }.exit_code(), 0);
        assert_eq!(ProcessStatus::Exited { code: 3 }.exit_code(), 3);
        assert_eq!(ProcessStatus::Signaled { signal: 9 }.exit_code(), 137);
        assert_eq!(ProcessStatus::Unknown.exit_code(), 1);
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(TerminationSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(TerminationSignal::Terminate.to_string(), "SIGTERM");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ProcessStatus::Exited { code: 2 }.to_string(), "exit code 2");
        assert_eq!(ProcessStatus::Signaled { signal: 15 }.to_string(), "signal 15");
    }
}
