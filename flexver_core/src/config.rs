/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration for FlexVer from TOML with
    defaults for every key.

  Security / Safety Notes:
    Reads a single operator-owned file; no credentials are
    stored or expected.

  Dependencies:
    serde + toml for parsing, dirs for XDG locations.

  Operational Scope:
    Consumed by the composition root before any fetch or
    render takes place.

  Revision History:
    2025-11-12 COD  Authored configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Missing file means defaults, malformed file means error
    - Explicit sections per concern
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FlexverError, Result};
use crate::view::DEFAULT_CHANGELOG_URL;

const CONFIG_DIR: &str = "flexver";
const CONFIG_FILE: &str = "config.toml";

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlexverConfig {
    pub general: GeneralConfig,
    pub server: ServerConfig,
    pub release: ReleaseConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_dir: Option<PathBuf>,
}

/// FlexGet daemon API endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the daemon, e.g. `http://localhost:5050`. Unset means local check mode.
    pub base_url: Option<String>,
    pub timeout: u64,
    pub max_retries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: 15,
            max_retries: 3,
        }
    }
}

/// Package index consulted for the newest release.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub pypi_url: String,
    pub package: String,
    pub timeout: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            pypi_url: "https://pypi.org/pypi".into(),
            package: "FlexGet".into(),
            timeout: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub changelog_url: String,
    pub class_name: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            changelog_url: DEFAULT_CHANGELOG_URL.into(),
            class_name: String::new(),
        }
    }
}

impl FlexverConfig {
    /// Load from an explicit path, or the default location when `None`.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            FlexverError::Config(format!(
                "Failed to read configuration {}: {err}",
                path.display()
            ))
        })?;
        Self::parse(&text).map_err(|err| match err {
            FlexverError::Config(msg) => {
                FlexverError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|err| FlexverError::Config(format!("Invalid configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.timeout == 0 || self.release.timeout == 0 {
            return Err(FlexverError::Config("Timeouts must be at least 1 second".into()));
        }
        if self.release.package.trim().is_empty() {
            return Err(FlexverError::Config("release.package must not be empty".into()));
        }
        Ok(())
    }

    /// Directory receiving session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.general.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join(CONFIG_DIR)
                .join("logs")
        })
    }

    /// PyPI project page queried for the newest release.
    pub fn release_page(&self) -> String {
        format!(
            "{}/{}",
            self.release.pypi_url.trim_end_matches('/'),
            self.release.package
        )
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
