use crate::error::DaginitError;
use crate::launch::{LaunchCommand, ProcessLauncher};
use crate::process::{
    ProcessHandle, ProcessLifecycle, ProcessStatus, SignalSource, TerminationResult,
    TerminationSignal,
};
use crate::stdio::RedirectionTargets;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Lifecycle of a supervisor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SupervisorState {
    Starting,
    Running,
    ShuttingDown,
    Terminated,
}

/// Why a supervisor run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A termination signal arrived and the release was killed
    Signal(TerminationSignal),
    /// The release exited on its own while running
    ChildExited(ProcessStatus),
}

impl ExitReason {
    /// Exit status of the supervisor process itself
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitReason::Signal(_) => 0,
            ExitReason::ChildExited(status) => status.exit_code(),
        }
    }
}

enum Event {
    Signal(Option<TerminationSignal>),
    Exited(anyhow::Result<ProcessStatus>),
}

/// Launches the release once and ties its lifetime to signal delivery
pub struct Supervisor {
    state: SupervisorState,
    release_root: PathBuf,
    targets: RedirectionTargets,
}

impl Supervisor {
    pub fn new(release_root: impl Into<PathBuf>, targets: RedirectionTargets) -> Self {
        Self {
            state: SupervisorState::Starting,
            release_root: release_root.into(),
            targets,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        debug!("Supervisor {} -> {}", self.state, next);
        self.state = next;
    }

    /// Launch `command` and block until a termination signal arrives or the
    /// release exits. Consumes the supervisor so at most one launch happens,
    /// and the redirection targets are closed when it returns.
    ///
    /// `signals` must already be installed so nothing delivered during the
    /// launch is lost.
    ///
    /// After a signal the release is killed and then reaped before this
    /// returns. The reap has no time limit: a child stuck in uninterruptible
    /// sleep keeps the supervisor alive until the kernel lets it go.
    pub async fn run<M, S>(
        mut self,
        manager: &M,
        command: &LaunchCommand,
        mut signals: S,
        verbose: bool,
    ) -> Result<ExitReason, DaginitError>
    where
        M: ProcessLifecycle,
        S: SignalSource,
    {
        let mut handle = ProcessLauncher::launch(manager, command, &self.targets, verbose).await?;
        self.transition(SupervisorState::Running);

        let mut signals_open = true;
        loop {
            let event = tokio::select! {
                signal = signals.recv(), if signals_open => Event::Signal(signal),
                status = handle.wait() => Event::Exited(status),
            };

            match event {
                Event::Signal(Some(signal)) => {
                    self.shutdown(signal, &mut handle).await;
                    return Ok(self.finish(ExitReason::Signal(signal)));
                }
                Event::Signal(None) => {
                    warn!("Signal source closed, waiting for the release to exit");
                    signals_open = false;
                }
                Event::Exited(status) => {
                    let status = status.unwrap_or_else(|e| {
                        warn!("Error waiting for release: {e:#}");
                        ProcessStatus::Unknown
                    });
                    warn!("Release exited unexpectedly with {status}");
                    return Ok(self.finish(ExitReason::ChildExited(status)));
                }
            }
        }
    }

    async fn shutdown<H: ProcessHandle>(&mut self, signal: TerminationSignal, handle: &mut H) {
        self.transition(SupervisorState::ShuttingDown);
        info!(
            "Received '{signal}' signal. Shutting down {}...",
            self.release_root.display()
        );

        match handle.kill() {
            TerminationResult::Success | TerminationResult::AlreadyRequested => {}
            TerminationResult::ProcessNotFound => info!("Release already exited"),
        }

        match handle.wait().await {
            Ok(status) => debug!("Release stopped with {status}"),
            Err(e) => warn!("Error waiting for release: {e:#}"),
        }
    }

    fn finish(mut self, reason: ExitReason) -> ExitReason {
        self.transition(SupervisorState::Terminated);
        debug!(
            "Closing redirection targets {:?} / {:?}",
            self.targets.stdout.path(),
            self.targets.stderr.path()
        );
        reason
    }
}
