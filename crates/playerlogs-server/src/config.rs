use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub reports: ReportsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// Holds `modules.toml`, the cache file, `log-files/` and the crash report.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CacheSection {
    /// Relative to `server.data_dir`.
    #[serde(default = "default_cache_file")]
    pub file: String,
    /// Write keys in sorted order.
    #[serde(default = "default_true")]
    pub sorted: bool,
}

fn default_cache_file() -> String {
    ".cache.json".into()
}

fn default_true() -> bool {
    true
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            file: default_cache_file(),
            sorted: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportsSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Relative to `server.data_dir`.
    #[serde(default = "default_report_file")]
    pub file: String,
}

fn default_report_file() -> String {
    "crash-report.log".into()
}

impl Default for ReportsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            file: default_report_file(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`ServerConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn modules_path(&self) -> PathBuf {
        self.server.data_dir.join("modules.toml")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.server.data_dir.join(&self.cache.file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.server.data_dir.join("log-files")
    }

    /// `None` when crash reports are disabled.
    pub fn report_path(&self) -> Option<PathBuf> {
        self.reports
            .enabled
            .then(|| self.server.data_dir.join(&self.reports.file))
    }
}
