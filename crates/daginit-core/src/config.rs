use crate::error::ConfigError;
use derive_builder::Builder;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Names of the environment variables consulted during resolution
pub const EV_CONF_FILE: &str = "DAGINIT_CONF";
pub const EV_COOKIE: &str = "DAGINIT_COOKIE";
pub const EV_RELEASE_ROOT: &str = "DAGINIT_RELROOT";
pub const EV_RELEASE_VERSION: &str = "DAGINIT_RELVSN";
pub const EV_LOG_STDOUT: &str = "DAGINIT_LOG_STDOUT";
pub const EV_LOG_STDERR: &str = "DAGINIT_LOG_STDERR";
pub const EV_VERBOSE: &str = "DAGINIT_VERBOSE";
pub const EV_SAVE_OUT_ERR: &str = "DAGINIT_SAVE_OUT_ERR";

pub const DEFAULT_CONF_FILE: &str = "./daginit.conf";
pub const DEFAULT_RELEASE_ROOT: &str = "./relroot";
pub const DEFAULT_CAPTURE_DIR: &str = "/tmp/daginit";

const ENV_PREFIX: &str = "DAGINIT_";

const COOKIE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789=!?";
const COOKIE_MIN_LEN: usize = 9;
const COOKIE_MAX_LEN: usize = 29;

/// Everything needed to boot the release. Resolved once at startup and only
/// handed out by reference afterwards.
#[derive(Debug, Clone, PartialEq, Builder)]
// Unset builder fields come from `Default`
#[builder(setter(into), default)]
pub struct ProcessSpec {
    /// Shared cookie handed to the runtime with `--cookie`
    pub secret_token: String,
    pub release_root: PathBuf,
    pub release_version: String,
    pub log_stdout: bool,
    pub log_stderr: bool,
    /// Legacy capture mode: streams not logged into the release tree go to `capture_dir`
    pub save_std_out_err: bool,
    pub capture_dir: PathBuf,
    pub verbose: bool,
}

impl ProcessSpec {
    pub fn builder() -> ProcessSpecBuilder {
        ProcessSpecBuilder::default()
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self {
            secret_token: generate_cookie(),
            release_root: PathBuf::from(DEFAULT_RELEASE_ROOT),
            release_version: String::new(),
            log_stdout: false,
            log_stderr: false,
            save_std_out_err: false,
            capture_dir: PathBuf::from(DEFAULT_CAPTURE_DIR),
            verbose: false,
        }
    }
}

/// Random cookie of 9 to 29 characters
pub fn generate_cookie() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(COOKIE_MIN_LEN..=COOKIE_MAX_LEN);
    (0..len)
        .map(|_| COOKIE_CHARS[rng.gen_range(0..COOKIE_CHARS.len())] as char)
        .collect()
}

/// Parses the boolean tokens accepted in environment variables
pub fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "t" | "y" | "1" => Ok(true),
        "false" | "no" | "f" | "n" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Immutable copy of the `DAGINIT_*` variables taken once at startup.
///
/// Resolution reads from this map only; the process environment itself is
/// never modified and never forwarded to the release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvSnapshot(HashMap<String, String>);

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    pub fn from_vars<K: ToString, V: ToString, I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .filter(|(k, _)| k.starts_with(ENV_PREFIX))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn get_bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        self.get(name).map(|v| parse_bool(name, v)).transpose()
    }
}

/// On-disk configuration; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct ConfigFile {
    cookie: Option<String>,
    release_root: Option<PathBuf>,
    release_version: Option<String>,
    log_stdout: Option<bool>,
    log_stderr: Option<bool>,
    verbose: Option<bool>,
    save_std_out_err: Option<bool>,
}

/// Environment overrides, fully parsed before any of them is applied
#[derive(Debug, Default)]
struct EnvOverrides {
    cookie: Option<String>,
    release_root: Option<PathBuf>,
    release_version: Option<String>,
    log_stdout: Option<bool>,
    log_stderr: Option<bool>,
    verbose: Option<bool>,
    save_std_out_err: Option<bool>,
}

impl EnvOverrides {
    fn parse(env: &EnvSnapshot) -> Result<Self, ConfigError> {
        Ok(Self {
            cookie: env.get(EV_COOKIE).map(str::to_string),
            release_root: env.get(EV_RELEASE_ROOT).map(PathBuf::from),
            release_version: env.get(EV_RELEASE_VERSION).map(str::to_string),
            log_stdout: env.get_bool(EV_LOG_STDOUT)?,
            log_stderr: env.get_bool(EV_LOG_STDERR)?,
            verbose: env.get_bool(EV_VERBOSE)?,
            save_std_out_err: env.get_bool(EV_SAVE_OUT_ERR)?,
        })
    }
}

macro_rules! overlay {
    ($spec:ident, $layer:ident, { $($field:ident => $target:ident),* $(,)? }) => {
        $(
            if let Some(value) = $layer.$field {
                $spec.$target = value;
            }
        )*
    };
}

/// Merges defaults, the config file and the environment into a [`ProcessSpec`]
pub struct ConfigurationResolver {
    env: EnvSnapshot,
    default_path: PathBuf,
}

impl ConfigurationResolver {
    pub fn new(env: EnvSnapshot) -> Self {
        Self {
            env,
            default_path: PathBuf::from(DEFAULT_CONF_FILE),
        }
    }

    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Path of the config file: explicit override, then `DAGINIT_CONF`, then the default
    pub fn config_path(&self, file_override: Option<&Path>) -> PathBuf {
        file_override
            .map(Path::to_path_buf)
            .or_else(|| self.env.get(EV_CONF_FILE).map(PathBuf::from))
            .unwrap_or_else(|| self.default_path.clone())
    }

    pub fn resolve(&self, file_override: Option<&Path>) -> Result<ProcessSpec, ConfigError> {
        let path = self.config_path(file_override);
        info!("Using configuration file {}", path.display());

        let file = read_config_file(&path)?;
        let overrides = EnvOverrides::parse(&self.env)?;

        let mut spec = ProcessSpec::default();
        overlay!(spec, file, {
            cookie => secret_token,
            release_root => release_root,
            release_version => release_version,
            log_stdout => log_stdout,
            log_stderr => log_stderr,
            verbose => verbose,
            save_std_out_err => save_std_out_err,
        });
        overlay!(spec, overrides, {
            cookie => secret_token,
            release_root => release_root,
            release_version => release_version,
            log_stdout => log_stdout,
            log_stderr => log_stderr,
            verbose => verbose,
            save_std_out_err => save_std_out_err,
        });

        if spec.secret_token.is_empty() {
            tracing::warn!("Configured cookie is empty, generating a random one");
            spec.secret_token = generate_cookie();
        }

        Ok(spec)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "Configuration file {} not found. Using default config values.",
                path.display()
            );
            return Ok(ConfigFile::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigFile::default());
    }

    serde_json::from_slice(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
