//! Service configuration.
//!
//! Loaded from the first YAML file found on the search path, then
//! overridden by `GALAXY_*` environment variables. When no file exists a
//! default one is written to the first search path.
//!
//! Loading runs before the log subscriber exists, so what happened is kept
//! on the [`Config`] and emitted by [`Config::report`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{Level, info, warn};

pub const CONFIG_FILE_NAME: &str = "galaxy.yaml";
pub const ENV_PREFIX: &str = "GALAXY";
pub const DEFAULT_APP_NAME: &str = "Galaxy";

/// Top-level configuration file layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub log: LogConfig,

    /// Where the values came from.
    #[serde(skip)]
    pub origin: ConfigOrigin,

    /// Overrides that were ignored while loading.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Outcome of the config file lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigOrigin {
    /// No search path was given.
    #[default]
    Defaults,
    /// Read from an existing file.
    File(PathBuf),
    /// No file was found; defaults were written here.
    WroteDefault(PathBuf),
    /// No file was found and writing the defaults failed.
    WriteFailed { path: PathBuf, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: PathBuf::from("galaxy.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
}

/// Log verbosity accepted in the config file and `GALAXY_LOGLEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn to_tracing(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Config file search path, first match wins.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("galaxy").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc/galaxy").join(CONFIG_FILE_NAME));
    paths
}

impl Config {
    /// Load from `explicit` if given, otherwise from [`search_paths`], then
    /// apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let paths = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => search_paths(),
        };
        let mut config = Self::load_from_paths(&paths)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read the first existing file in `paths`. A file that exists but does
    /// not parse is an error.
    pub fn load_from_paths(paths: &[PathBuf]) -> Result<Self> {
        for path in paths {
            if path.is_file() {
                return Self::load_file(path);
            }
        }

        let mut config = Self::default();
        if let Some(path) = paths.first() {
            config.origin = match config.write(path) {
                Ok(()) => ConfigOrigin::WroteDefault(path.clone()),
                Err(e) => ConfigOrigin::WriteFailed {
                    path: path.clone(),
                    error: format!("{:#}", e),
                },
            };
        }
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("couldn't parse config {}", path.display()))?;
        config.origin = ConfigOrigin::File(path.to_path_buf());
        Ok(config)
    }

    /// Write as YAML, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply `GALAXY_*` overrides. Unparsable values are ignored and noted
    /// in [`Config::warnings`].
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));

        if let Some(path) = var("DB_PATH") {
            self.server.db_path = PathBuf::from(path);
        }
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => self
                    .warnings
                    .push(format!("Ignoring invalid {}_PORT '{}'", ENV_PREFIX, port)),
            }
        }
        if let Some(level) = var("LOGLEVEL") {
            match level.parse() {
                Ok(level) => self.log.level = level,
                Err(e) => self
                    .warnings
                    .push(format!("Ignoring {}_LOGLEVEL: {}", ENV_PREFIX, e)),
            }
        }
    }

    /// Log how the configuration was loaded. Call after logging is set up.
    pub fn report(&self) {
        match &self.origin {
            ConfigOrigin::Defaults => info!("Using built-in config defaults"),
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
            ConfigOrigin::WroteDefault(path) => {
                warn!("No config file found, wrote default to {}", path.display())
            }
            ConfigOrigin::WriteFailed { path, error } => warn!(
                "No config file found and could not write default to {}: {}",
                path.display(),
                error
            ),
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

/// Identity of the running node, reported by `/about`.
#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub app: String,
    pub version: String,
    pub node_id: String,
    /// Start time in nanoseconds since the Unix epoch.
    pub started_at: u64,
}

impl AppInfo {
    pub fn new(app: &AppConfig) -> Self {
        Self {
            app: app.name.clone(),
            version: app.version.clone(),
            node_id: format!("solo-{}", uuid::Uuid::new_v4()),
            started_at: crate::db::now_ns(),
        }
    }
}
