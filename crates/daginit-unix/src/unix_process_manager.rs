use anyhow::Result;
use async_trait::async_trait;
use daginit_core::{
    LaunchCommand, ProcessHandle, ProcessId, ProcessLifecycle, ProcessStatus, RedirectionTargets,
    TerminationResult,
};

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Stdio};
    use tokio::process::{Child, Command};
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;
    use tracing::{debug, info, warn};

    /// Unix-specific process handle.
    ///
    /// The `Child` lives in a waiter task; `kill` cancels a token the task
    /// listens on, so the kill and the reap never compete for the child.
    pub struct UnixProcessHandle {
        pid: Option<ProcessId>,
        kill_token: CancellationToken,
        waiter: JoinHandle<std::io::Result<ExitStatus>>,
        status: Option<ProcessStatus>,
    }

    impl UnixProcessHandle {
        pub fn new(child: Child) -> Self {
            let pid = child.id();
            let kill_token = CancellationToken::new();
            let waiter = tokio::spawn(wait_or_kill(child, kill_token.clone()));
            Self {
                pid,
                kill_token,
                waiter,
                status: None,
            }
        }
    }

    async fn wait_or_kill(
        mut child: Child,
        kill_token: CancellationToken,
    ) -> std::io::Result<ExitStatus> {
        tokio::select! {
            status = child.wait() => status,
            _ = kill_token.cancelled() => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to send SIGKILL to process {:?}: {e}", child.id());
                } else {
                    info!("Sent SIGKILL to process {:?}", child.id());
                }
                child.wait().await
            }
        }
    }

    fn to_status(status: ExitStatus) -> ProcessStatus {
        match (status.code(), status.signal()) {
            (Some(code), _) => ProcessStatus::Exited { code },
            (None, Some(signal)) => ProcessStatus::Signaled { signal },
            (None, None) => ProcessStatus::Unknown,
        }
    }

    #[async_trait]
    impl ProcessHandle for UnixProcessHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            self.pid
        }

        async fn wait(&mut self) -> Result<ProcessStatus> {
            if let Some(status) = self.status {
                return Ok(status);
            }
            let status = to_status((&mut self.waiter).await??);
            debug!("Process {:?} finished with {status}", self.pid);
            self.status = Some(status);
            Ok(status)
        }

        fn kill(&self) -> TerminationResult {
            if self.kill_token.is_cancelled() {
                return TerminationResult::AlreadyRequested;
            }
            if self.status.is_some() || self.waiter.is_finished() {
                return TerminationResult::ProcessNotFound;
            }
            self.kill_token.cancel();
            TerminationResult::Success
        }
    }

    /// Starts the release with tokio's process API, attaching the
    /// redirection targets as the child's stdout/stderr
    #[derive(Debug, Default)]
    pub struct UnixProcessManager;

    impl UnixProcessManager {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl ProcessLifecycle for UnixProcessManager {
        type Handle = UnixProcessHandle;

        async fn spawn_process(
            &self,
            command: &LaunchCommand,
            targets: &RedirectionTargets,
        ) -> Result<Self::Handle> {
            let mut cmd = Command::new(command.executable());
            cmd.arg0(command.program_name())
                .args(command.args())
                .env_clear()
                .envs(command.env())
                .stdin(Stdio::null())
                .stdout(targets.stdout.to_stdio()?)
                .stderr(targets.stderr.to_stdio()?);

            let child = cmd.spawn()?;

            if let Some(pid) = child.id() {
                debug!(
                    "Spawned Unix process: {} (PID: {pid})",
                    command.executable().display()
                );
            }

            Ok(UnixProcessHandle::new(child))
        }

        fn platform_name(&self) -> &'static str {
            "Unix"
        }
    }
}

// Re-export the Unix implementation when on Unix systems
#[cfg(unix)]
pub use unix_impl::{UnixProcessHandle, UnixProcessManager};
