//! Config file handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::Args;
use crate::client::DEFAULT_USER_AGENT;
use crate::errors::HttptermError;
use crate::net::ConnectionSettings;

/// Overrides the config directory (mainly for tests).
pub const CONFIG_DIR_ENV: &str = "HTTPTERM_CONFIG_DIR";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 60001;

/// `[defaults]` table of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileDefaults {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_ms: Option<u64>,
    pub poll_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    defaults: FileDefaults,
}

impl FileDefaults {
    /// Parse the contents of a config file.
    pub fn from_toml(content: &str) -> Result<Self, HttptermError> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| HttptermError::Config(format!("Invalid config TOML: {}", e)))?;
        Ok(file.defaults)
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, HttptermError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HttptermError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load the config file.
    ///
    /// An explicit path must exist and parse. The default file is optional,
    /// and a broken one only produces a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, HttptermError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        let path = default_config_file();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        match Self::read(&path) {
            Ok(defaults) => Ok(defaults),
            Err(e) => {
                warn!("{}; using defaults", e);
                Ok(Self::default())
            }
        }
    }
}

/// Get the config directory
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|p| p.join("httpterm"))
        .unwrap_or_else(|| PathBuf::from(".httpterm"))
}

pub fn default_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Resolved settings handed to the client and menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Quick-connect server.
    pub host: String,
    pub port: u16,
    /// Server chosen on the command line, selected at startup.
    pub preselected: Option<(String, u16)>,
    pub connect_timeout: Duration,
    pub poll_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let settings = ConnectionSettings::default();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            preselected: None,
            connect_timeout: settings.connect_timeout,
            poll_timeout: settings.poll_timeout,
            read_timeout: settings.read_timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Merge file values over built-in defaults, then CLI flags over both.
    pub fn resolve(args: &Args, file: &FileDefaults) -> Self {
        let base = Self::default();
        let ms = Duration::from_millis;

        let host = file.host.clone().unwrap_or(base.host);
        let port = file.port.unwrap_or(base.port);

        let preselected = match (args.host, args.port) {
            (None, None) => None,
            (cli_host, cli_port) => Some((
                cli_host.map(|h| h.to_string()).unwrap_or_else(|| host.clone()),
                cli_port.unwrap_or(port),
            )),
        };

        Self {
            host,
            port,
            preselected,
            connect_timeout: args
                .connect_timeout
                .or(file.connect_timeout_ms)
                .map(ms)
                .unwrap_or(base.connect_timeout),
            poll_timeout: args
                .poll_timeout
                .or(file.poll_timeout_ms)
                .map(ms)
                .unwrap_or(base.poll_timeout),
            read_timeout: args
                .read_timeout
                .or(file.read_timeout_ms)
                .map(ms)
                .unwrap_or(base.read_timeout),
            user_agent: file.user_agent.clone().unwrap_or(base.user_agent),
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            connect_timeout: self.connect_timeout,
            poll_timeout: self.poll_timeout,
            read_timeout: self.read_timeout,
        }
    }
}
