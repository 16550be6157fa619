use crate::config::ProcessSpec;
use crate::error::LaunchError;
use crate::process::{ProcessHandle, ProcessLifecycle};
use crate::redact::{SECRET_FLAG, SECRET_MASK};
use crate::release::{BOOT_FILE, ERL_CONFIG, LIB_DIR, ReleasePaths, VM_ARGS};
use crate::stdio::RedirectionTargets;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// argv[0] seen by the release
pub const PROGRAM_NAME: &str = "elixir";
pub const NODE_NAME: &str = "demo";
pub const ERL_FLAGS: &str = "+fnue -mode embedded";
pub const BOOT_VAR: &str = "RELEASE_LIB";

/// Fully resolved command line and environment for the release
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchCommand {
    executable: PathBuf,
    program_name: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl LaunchCommand {
    pub fn new(spec: &ProcessSpec, paths: &ReleasePaths) -> Self {
        let path = |template: &str| paths.render(template).display().to_string();
        let args = vec![
            SECRET_FLAG.to_string(),
            spec.secret_token.clone(),
            "--boot".to_string(),
            path(BOOT_FILE),
            "--boot-var".to_string(),
            BOOT_VAR.to_string(),
            path(LIB_DIR),
            "--sname".to_string(),
            NODE_NAME.to_string(),
            "--erl".to_string(),
            ERL_FLAGS.to_string(),
            "--erl-config".to_string(),
            path(ERL_CONFIG),
            "--vm-args".to_string(),
            path(VM_ARGS),
            "--no-halt".to_string(),
        ];

        // HOME lets a remote console find the cookie and runtime files later
        let env = BTreeMap::from([("HOME".to_string(), paths.root().display().to_string())]);

        Self {
            executable: paths.boot_script(),
            program_name: PROGRAM_NAME.to_string(),
            args,
            env,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Arguments after argv[0]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The complete environment of the release; nothing is inherited
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Executable followed by the arguments, space separated. Contains the cookie.
    pub fn render(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// [`render`](Self::render) with the argument after `--cookie` replaced
    /// by the mask, whatever characters the cookie contains
    pub fn render_redacted(&self) -> String {
        let args = self.args.iter().enumerate().map(|(i, arg)| {
            if i > 0 && self.args[i - 1] == SECRET_FLAG {
                SECRET_MASK
            } else {
                arg.as_str()
            }
        });
        std::iter::once(self.executable.display().to_string())
            .chain(args.map(str::to_string))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Starts the release through a platform backend
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub async fn launch<M: ProcessLifecycle>(
        manager: &M,
        command: &LaunchCommand,
        targets: &RedirectionTargets,
        verbose: bool,
    ) -> Result<M::Handle, LaunchError> {
        info!("Booting release using {}", command.executable().display());
        if !command.executable().exists() {
            return Err(LaunchError::MissingBootScript(
                command.executable().to_path_buf(),
            ));
        }
        if verbose {
            info!("Release command: '{}'", command.render_redacted());
        }

        let handle = manager
            .spawn_process(command, targets)
            .await
            .map_err(|source| LaunchError::Spawn {
                command: command.executable().display().to_string(),
                source,
            })?;

        match handle.get_pid() {
            Some(pid) => info!("Release running on OS process {pid}"),
            None => tracing::warn!("Release started but its PID is unknown"),
        }
        Ok(handle)
    }
}
