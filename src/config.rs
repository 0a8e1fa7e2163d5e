use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::controller::ControllerKind;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Contents of config.toml. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub controller: ControllerSection,
    pub snapshots: SnapshotSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_tls: bool,
    /// humantime duration, e.g. "30s"
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSection {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("controller {field} is not configured; set [controller] {field} in config.toml or {env_var}")]
    Missing {
        field: &'static str,
        env_var: &'static str,
    },
}

/// Connection settings for a controller client.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub username: String,
    pub password: String,
    pub verify_tls: bool,
    pub timeout: Duration,
}

pub struct Config {
    pub controller: ControllerSection,
    pub snapshot_dir: PathBuf,
}

impl Config {
    /// Load config from `path`, `APDIFF_CONFIG`, or the per-user config dir,
    /// then apply `APDIFF_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path.map(Path::to_path_buf).or_else(|| env::var_os("APDIFF_CONFIG").map(PathBuf::from)) {
            Some(explicit) => read_file(&explicit)?,
            None => match default_config_path() {
                Some(default) if default.exists() => read_file(&default)?,
                _ => FileConfig::default(),
            },
        };

        let mut config = Config::from_file(file);
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(file: FileConfig) -> Self {
        Config {
            controller: file.controller,
            snapshot_dir: file.snapshots.dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("APDIFF_BASE_URL") {
            self.controller.base_url = Some(url);
        }
        if let Some(user) = lookup("APDIFF_USERNAME") {
            self.controller.username = Some(user);
        }
        if let Some(pass) = lookup("APDIFF_PASSWORD") {
            self.controller.password = Some(pass);
        }
    }

    /// Credentials and transport options. Only commands that talk to the
    /// controller need these, so missing values are reported lazily.
    pub fn controller_settings(&self) -> Result<ControllerSettings> {
        let username = self
            .controller
            .username
            .clone()
            .ok_or(ConfigError::Missing { field: "username", env_var: "APDIFF_USERNAME" })?;
        let password = self
            .controller
            .password
            .clone()
            .ok_or(ConfigError::Missing { field: "password", env_var: "APDIFF_PASSWORD" })?;

        let timeout = match &self.controller.timeout {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("parsing [controller] timeout '{raw}'"))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(ControllerSettings {
            username,
            password,
            verify_tls: self.controller.verify_tls,
            timeout,
        })
    }

    pub fn base_url_for(&self, kind: &ControllerKind) -> Result<String> {
        match kind {
            ControllerKind::Conductor => self
                .controller
                .base_url
                .clone()
                .ok_or_else(|| ConfigError::Missing { field: "base_url", env_var: "APDIFF_BASE_URL" }.into()),
            ControllerKind::Controller { name } => Ok(ControllerKind::controller_url(name)),
        }
    }
}

/// ~/.config/apdiff/config.toml or platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "apdiff").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}
