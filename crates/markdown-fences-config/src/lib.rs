use markdown_fences_engine::{FenceLine, FenceRules};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shortest fence a commonmark renderer recognises.
pub const MIN_FENCE_LEN: usize = FenceLine::MIN_TICKS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting in config file at {config_path}: {message}")]
    InvalidSetting {
        config_path: PathBuf,
        message: String,
    },
}

/// Which info-string languages are treated as fence containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FenceSettings {
    pub container_languages: Vec<String>,
    pub diff_languages: Vec<String>,
    pub min_fence_len: usize,
}

impl Default for FenceSettings {
    fn default() -> Self {
        let rules = FenceRules::default();
        Self {
            container_languages: rules.container_languages,
            diff_languages: rules.diff_languages,
            min_fence_len: rules.min_fence_len,
        }
    }
}

impl From<FenceSettings> for FenceRules {
    fn from(settings: FenceSettings) -> Self {
        FenceRules {
            container_languages: settings.container_languages,
            diff_languages: settings.diff_languages,
            min_fence_len: settings.min_fence_len,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fences: FenceSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.normalize_keywords();
        config.validate(config_path)?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-fences");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn normalize_keywords(&mut self) {
        for keywords in [
            &mut self.fences.container_languages,
            &mut self.fences.diff_languages,
        ] {
            for keyword in keywords.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            keywords.retain(|k| !k.is_empty());
        }
    }

    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        if self.fences.min_fence_len < MIN_FENCE_LEN {
            return Err(ConfigError::InvalidSetting {
                config_path: config_path.to_path_buf(),
                message: format!(
                    "fences.min_fence_len must be at least {MIN_FENCE_LEN}, got {}",
                    self.fences.min_fence_len
                ),
            });
        }
        Ok(())
    }
}
