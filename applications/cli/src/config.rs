/// Client configuration
use crate::error::{CliError, Result};
use melo_catalog::{CatalogConfig, DEFAULT_BASE_URL, DEFAULT_LANG};
use melo_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, read from the working directory if present
pub const DEFAULT_CONFIG_FILE: &str = "melo.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeloConfig {
    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Size of the "recently heard" list
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Signed-in user; absent means signed out
    #[serde(default)]
    pub user_id: Option<String>,
}

impl MeloConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; without one, `melo.toml` is read when
    /// present. Environment variables prefixed with `MELO_` override both,
    /// with `__` between section and key (`MELO_CATALOG__BASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("MELO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.catalog.base_url.trim();
        if base_url.is_empty() {
            return Err(CliError::Config("catalog.base_url is required".to_string()));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "catalog.base_url must be http(s), got {:?}",
                base_url
            )));
        }

        if self.playback.history_limit == 0 {
            return Err(CliError::Config(
                "playback.history_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(self.catalog.base_url.clone())
            .with_default_lang(self.catalog.default_lang.clone())
            .with_timeout(Duration::from_secs(self.catalog.timeout_secs))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            history_limit: self.playback.history_limit,
        }
    }
}

impl Default for MeloConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            playback: default_playback(),
            session: SessionSettings::default(),
        }
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        base_url: default_base_url(),
        default_lang: default_lang(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        history_limit: default_history_limit(),
    }
}

fn default_history_limit() -> usize {
    10
}
