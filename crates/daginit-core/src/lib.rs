//! daginit core - platform-independent pieces of the init supervisor
//!
//! Configuration resolution, cookie redaction, release path templating,
//! output redirection, the launch command and the supervisor state machine.
//! Platform crates implement [`ProcessLifecycle`] and [`SignalSource`].

pub mod config;
pub mod error;
pub mod launch;
pub mod process;
pub mod redact;
pub mod release;
pub mod stdio;
pub mod supervisor;

pub use config::*;
pub use error::*;
pub use launch::{LaunchCommand, ProcessLauncher};
pub use process::*;
pub use redact::redact;
pub use release::ReleasePaths;
pub use stdio::{OutputTarget, RedirectionTargets, StreamRedirector};
pub use supervisor::{ExitReason, Supervisor, SupervisorState};
