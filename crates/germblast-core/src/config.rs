//! Configuration loading and typed config structures for the session server.
//!
//! The canonical configuration lives in `germblast-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file and applies
//! environment overrides. Every section has defaults, so an empty file is a
//! valid configuration.

use std::path::Path;

use germblast_world::{SpawnConfig, WorldError};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The spawn section describes an unusable field.
    #[error("invalid spawn config: {source}")]
    Spawn {
        /// The underlying validation error.
        #[from]
        source: WorldError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `germblast-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Game timing and spawn settings.
    #[serde(default)]
    pub game: GameConfig,

    /// Sticky routing for gun devices behind a load balancer.
    #[serde(default)]
    pub sticky_session: StickySessionConfig,

    /// Log filter defaults.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `GERMBLAST_HOST` overrides `server.host`
    /// - `GERMBLAST_PORT` overrides `server.port`
    /// - `GERMBLAST_DOMAIN` overrides `sticky_session.domain`
    /// - `HOSTNAME` overrides `sticky_session.hostname`; with neither set,
    ///   the kernel host name is used
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Spawn`] if the spawn section is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply in both cases.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Spawn`] if the spawn section is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.game.spawn.validate()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.server.apply_env_overrides();
        self.sticky_session.apply_env_overrides();
    }
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Override listener settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GERMBLAST_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("GERMBLAST_PORT") {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid GERMBLAST_PORT"),
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Game timing and spawn settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Nominal game length in seconds, sent to clients.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Extra seconds after `duration_secs` before a game counts as finished.
    #[serde(default = "default_finish_grace_secs")]
    pub finish_grace_secs: u64,

    /// Log every inbound event with its session token.
    #[serde(default)]
    pub log_events: bool,

    /// Grid, catalog, and epoch timing.
    #[serde(default)]
    pub spawn: SpawnConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            finish_grace_secs: default_finish_grace_secs(),
            log_events: false,
            spawn: SpawnConfig::default(),
        }
    }
}

/// Sticky routing for gun devices.
///
/// Behind a load balancer the gun must reach the same instance as its
/// screen. Instances named `special<N>.<anything>` advertise
/// `s<N>.<domain>` to gun screens so the gun can connect there directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StickySessionConfig {
    /// Advertise a per-instance domain to gun screens.
    #[serde(default)]
    pub enabled: bool,

    /// Base domain the instance prefix is prepended to.
    #[serde(default)]
    pub domain: String,

    /// This instance's host name.
    #[serde(default)]
    pub hostname: Option<String>,
}

impl StickySessionConfig {
    /// Override routing settings with environment variables when set.
    ///
    /// Without `HOSTNAME` or a configured host name, the system host name
    /// is used.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GERMBLAST_DOMAIN") {
            self.domain = val;
        }
        if let Ok(val) = std::env::var("HOSTNAME") {
            self.hostname = Some(val);
        } else if self.hostname.is_none() {
            self.hostname = system_hostname();
        }
    }

    /// The domain a gun should connect to, if sticky routing applies.
    pub fn sticky_domain(&self) -> Option<String> {
        if !self.enabled || self.domain.is_empty() {
            return None;
        }
        let instance = instance_number(self.hostname.as_deref()?)?;
        Some(format!("s{instance}.{}", self.domain))
    }
}

/// Files holding the system host name, checked in order.
const HOSTNAME_FILES: [&str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];

/// The system host name, if one of [`HOSTNAME_FILES`] names it.
fn system_hostname() -> Option<String> {
    HOSTNAME_FILES.iter().find_map(|path| {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| first_hostname(&contents))
    })
}

/// First non-empty line of a host name file.
fn first_hostname(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

/// Extract `N` from a host name of the form `special<N>.<rest>`.
fn instance_number(hostname: &str) -> Option<&str> {
    let rest = hostname.strip_prefix("special")?;
    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    let (digits, tail) = rest.split_at(digits_end);
    (!digits.is_empty() && tail.starts_with('.')).then_some(digits)
}

/// Log filter defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_duration_secs() -> u64 {
    60
}

const fn default_finish_grace_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}
