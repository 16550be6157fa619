use crate::config::ProcessSpec;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the release version in path templates
pub const VERSION_PLACEHOLDER: &str = "%s";

pub const BOOT_SCRIPT: &str = "releases/%s/elixir";
pub const BOOT_FILE: &str = "releases/%s/start";
pub const LIB_DIR: &str = "lib";
pub const ERL_CONFIG: &str = "releases/%s/sys";
pub const VM_ARGS: &str = "releases/%s/vm.args";
pub const LOG_DIR: &str = "releases/%s/logs";
pub const STDOUT_LOG: &str = "releases/%s/logs/stdout.log";
pub const STDERR_LOG: &str = "releases/%s/logs/stderr.log";

/// Resolves release-relative path templates against one root and version
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePaths {
    root: PathBuf,
    version: String,
}

impl ReleasePaths {
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            version: version.into(),
        }
    }

    pub fn from_spec(spec: &ProcessSpec) -> Self {
        Self::new(spec.release_root.clone(), spec.release_version.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Substitutes the version into `template` (at most one placeholder) and
    /// joins the result onto the root. Empty path segments are dropped.
    pub fn render(&self, template: &str) -> PathBuf {
        let fragment = template.replacen(VERSION_PLACEHOLDER, &self.version, 1);
        let fragment: PathBuf = Path::new(&fragment).components().collect();
        self.root.join(fragment)
    }

    pub fn boot_script(&self) -> PathBuf {
        self.render(BOOT_SCRIPT)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.render(LOG_DIR)
    }

    pub fn stdout_log(&self) -> PathBuf {
        self.render(STDOUT_LOG)
    }

    pub fn stderr_log(&self) -> PathBuf {
        self.render(STDERR_LOG)
    }
}
