use std::path::PathBuf;
use thiserror::Error;

/// Failures while merging defaults, the config file and the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid boolean value for {var}: {value}")]
    InvalidBoolean { var: String, value: String },
}

/// Failures while preparing the stdout/stderr targets of the release
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("Error creating log directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating log file {}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error duplicating handle for {}", path.display())]
    Duplicate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while starting the release
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Boot script {} does not exist", .0.display())]
    MissingBootScript(PathBuf),

    #[error("Error starting release {command}")]
    Spawn {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Top-level error for a supervisor run. Every variant is fatal.
///
/// Messages name only their own step; the underlying cause is reached
/// through `source()`, so report with `{:#}` on an `anyhow::Error`.
#[derive(Error, Debug)]
pub enum DaginitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Redirect(#[from] RedirectError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Error registering signal handlers")]
    Signal(#[source] std::io::Error),
}

impl DaginitError {
    /// Startup stage the error belongs to, used as a log field
    pub fn stage(&self) -> &'static str {
        match self {
            DaginitError::Config(_) => "configuration",
            DaginitError::Redirect(_) => "redirection",
            DaginitError::Launch(_) => "launch",
            DaginitError::Signal(_) => "signals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::InvalidBoolean {
            var: "DAGINIT_LOG_STDOUT".to_string(),
            value: "maybe".to_string(),
        };
        let display = format!("{error}");
        assert!(display.contains("DAGINIT_LOG_STDOUT"));
        assert!(display.contains("maybe"));

        let error = LaunchError::MissingBootScript(PathBuf::from("/opt/rel/releases/1/elixir"));
        assert!(format!("{error}").contains("/opt/rel/releases/1/elixir"));
    }

    #[test]
    fn test_error_stage() {
        let error: DaginitError = ConfigError::InvalidBoolean {
            var: "X".to_string(),
            value: "y?".to_string(),
        }
        .into();
        assert_eq!(error.stage(), "configuration");

        let error: DaginitError = RedirectError::CreateDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(error.stage(), "redirection");

        let error: DaginitError = LaunchError::MissingBootScript(PathBuf::from("x")).into();
        assert_eq!(error.stage(), "launch");
    }

    #[test]
    fn test_transparent_display() {
        let error: DaginitError = LaunchError::MissingBootScript(PathBuf::from("boot")).into();
        assert_eq!(format!("{error}"), "Boot script boot does not exist");
    }

    #[test]
    fn test_cause_chain_is_reported_once() {
        let error: DaginitError = ConfigError::Read {
            path: PathBuf::from("/etc/daginit.conf"),
            source: std::io::Error::other("disk on fire"),
        }
        .into();
        assert_eq!(
            format!("{error}"),
            "Error reading configuration file /etc/daginit.conf"
        );

        let report = format!("{:#}", anyhow::Error::from(error));
        assert_eq!(
            report,
            "Error reading configuration file /etc/daginit.conf: disk on fire"
        );
    }

    #[test]
    fn test_signal_error_keeps_source() {
        let error = DaginitError::Signal(std::io::Error::other("no driver"));
        assert_eq!(error.stage(), "signals");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(error)),
            "Error registering signal handlers: no driver"
        );
    }
}
