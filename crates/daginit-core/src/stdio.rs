use crate::config::ProcessSpec;
use crate::error::RedirectError;
use crate::release::ReleasePaths;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::info;

const NULL_DEVICE: &str = "/dev/null";
const CAPTURE_STDOUT: &str = "stdout.log";
const CAPTURE_STDERR: &str = "stderr.log";

/// Where one of the release's output streams goes
#[derive(Debug)]
pub enum OutputTarget {
    /// Discarded by the platform null device
    Null,
    /// Written to a file the supervisor created and keeps open
    File { path: PathBuf, file: File },
}

impl OutputTarget {
    fn create(path: PathBuf) -> Result<Self, RedirectError> {
        let file = File::create(&path).map_err(|source| RedirectError::CreateFile {
            path: path.clone(),
            source,
        })?;
        Ok(OutputTarget::File { path, file })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputTarget::Null => None,
            OutputTarget::File { path, .. } => Some(path),
        }
    }

    /// A fresh [`Stdio`] for the child. Files are duplicated so the
    /// supervisor keeps its own descriptor.
    pub fn to_stdio(&self) -> Result<Stdio, RedirectError> {
        match self {
            OutputTarget::Null => Ok(Stdio::null()),
            OutputTarget::File { path, file } => file
                .try_clone()
                .map(Stdio::from)
                .map_err(|source| RedirectError::Duplicate {
                    path: path.clone(),
                    source,
                }),
        }
    }

    fn describe(&self) -> String {
        match self.path() {
            Some(path) => path.display().to_string(),
            None => NULL_DEVICE.to_string(),
        }
    }
}

/// The stdout/stderr pair handed to the release
#[derive(Debug)]
pub struct RedirectionTargets {
    pub stdout: OutputTarget,
    pub stderr: OutputTarget,
}

impl RedirectionTargets {
    pub fn null() -> Self {
        Self {
            stdout: OutputTarget::Null,
            stderr: OutputTarget::Null,
        }
    }
}

/// Opens the output targets for the release according to the log flags
pub struct StreamRedirector;

impl StreamRedirector {
    pub fn open(
        spec: &ProcessSpec,
        paths: &ReleasePaths,
    ) -> Result<RedirectionTargets, RedirectError> {
        if spec.log_stdout || spec.log_stderr {
            create_dir(&paths.log_dir())?;
        }
        let capture = spec.save_std_out_err && !(spec.log_stdout && spec.log_stderr);
        if capture {
            create_dir(&spec.capture_dir)?;
        }

        let stdout = if spec.log_stdout {
            OutputTarget::create(paths.stdout_log())?
        } else if capture {
            OutputTarget::create(spec.capture_dir.join(CAPTURE_STDOUT))?
        } else {
            OutputTarget::Null
        };
        info!("stdout logged to {}", stdout.describe());

        let stderr = if spec.log_stderr {
            OutputTarget::create(paths.stderr_log())?
        } else if capture {
            OutputTarget::create(spec.capture_dir.join(CAPTURE_STDERR))?
        } else {
            OutputTarget::Null
        };
        info!("stderr logged to {}", stderr.describe());

        Ok(RedirectionTargets { stdout, stderr })
    }
}

fn create_dir(path: &Path) -> Result<(), RedirectError> {
    std::fs::create_dir_all(path).map_err(|source| RedirectError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(root: &Path, log_stdout: bool, log_stderr: bool) -> ProcessSpec {
        ProcessSpec::builder()
            .release_root(root)
            .release_version("9.9.9")
            .log_stdout(log_stdout)
            .log_stderr(log_stderr)
            .capture_dir(root.join("capture"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_flags_creates_nothing() {
        let root = TempDir::new().unwrap();
        let spec = spec(root.path(), false, false);
        let targets = StreamRedirector::open(&spec, &ReleasePaths::from_spec(&spec)).unwrap();

        assert!(matches!(targets.stdout, OutputTarget::Null));
        assert!(matches!(targets.stderr, OutputTarget::Null));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stdout_only() {
        let root = TempDir::new().unwrap();
        let spec = spec(root.path(), true, false);
        let paths = ReleasePaths::from_spec(&spec);
        let targets = StreamRedirector::open(&spec, &paths).unwrap();

        assert_eq!(targets.stdout.path(), Some(paths.stdout_log().as_path()));
        assert!(matches!(targets.stderr, OutputTarget::Null));
        assert!(paths.stdout_log().is_file());
        assert!(!paths.stderr_log().exists());
    }

    #[test]
    fn test_truncates_existing_log() {
        let root = TempDir::new().unwrap();
        let spec = spec(root.path(), false, true);
        let paths = ReleasePaths::from_spec(&spec);
        std::fs::create_dir_all(paths.log_dir()).unwrap();
        std::fs::write(paths.stderr_log(), "old output").unwrap();

        let _targets = StreamRedirector::open(&spec, &paths).unwrap();
        assert_eq!(std::fs::read(paths.stderr_log()).unwrap().len(), 0);
    }

    #[test]
    fn test_log_dir_creation_failure() {
        let root = TempDir::new().unwrap();
        // A plain file where the releases directory should be
        std::fs::write(root.path().join("releases"), "").unwrap();
        let spec = spec(root.path(), true, true);

        let err = StreamRedirector::open(&spec, &ReleasePaths::from_spec(&spec)).unwrap_err();
        assert!(matches!(err, RedirectError::CreateDir { .. }));
    }

    #[test]
    fn test_legacy_capture_mode() {
        let root = TempDir::new().unwrap();
        let mut spec = spec(root.path(), true, false);
        spec.save_std_out_err = true;
        let paths = ReleasePaths::from_spec(&spec);
        let targets = StreamRedirector::open(&spec, &paths).unwrap();

        assert_eq!(targets.stdout.path(), Some(paths.stdout_log().as_path()));
        assert_eq!(
            targets.stderr.path(),
            Some(root.path().join("capture").join("stderr.log").as_path())
        );
        assert!(!root.path().join("capture").join("stdout.log").exists());
    }

    #[test]
    fn test_to_stdio_keeps_supervisor_copy() {
        let root = TempDir::new().unwrap();
        let spec = spec(root.path(), true, false);
        let targets = StreamRedirector::open(&spec, &ReleasePaths::from_spec(&spec)).unwrap();

        let _first = targets.stdout.to_stdio().unwrap();
        let _second = targets.stdout.to_stdio().unwrap();
        let _null = targets.stderr.to_stdio().unwrap();
    }
}
