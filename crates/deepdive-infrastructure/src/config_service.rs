//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/deepdive/config.toml` (or an
//! explicit path), applies environment overrides, and caches the result.

use crate::paths::DeepDivePaths;
use deepdive_core::config::{ProviderKind, RootConfig};
use deepdive_core::error::{DeepDiveError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_PROVIDER: &str = "DEEPDIVE_PROVIDER";
pub const ENV_MODEL: &str = "DEEPDIVE_MODEL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A missing file yields defaults; an unreadable one is logged and also
    /// yields defaults.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(read_lock) = self.config.read() {
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = match self.load_file() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Using default configuration: {}", err);
                RootConfig::default()
            }
        };
        apply_env_overrides(&mut loaded, |name| std::env::var(name).ok());

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(DeepDivePaths::config_file()?),
        }
    }

    fn load_file(&self) -> Result<RootConfig> {
        let path = self.config_path()?;
        load_config_file(&path)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a config file; a missing or empty file yields defaults.
pub fn load_config_file(path: &Path) -> Result<RootConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(RootConfig::default());
        }
        Err(err) => return Err(err.into()),
    };

    if content.trim().is_empty() {
        return Ok(RootConfig::default());
    }

    toml::from_str(&content)
        .map_err(|e| DeepDiveError::config(format!("{}: {}", path.display(), e)))
}

/// Applies `DEEPDIVE_*` and provider key variables on top of file values.
pub fn apply_env_overrides(config: &mut RootConfig, var: impl Fn(&str) -> Option<String>) {
    let generation = &mut config.generation;

    if let Some(provider) = var(ENV_PROVIDER) {
        match provider.parse::<ProviderKind>() {
            Ok(kind) => generation.provider = kind,
            Err(err) => tracing::warn!("Ignoring {}: {}", ENV_PROVIDER, err),
        }
    }

    if let Some(model) = var(ENV_MODEL).filter(|m| !m.trim().is_empty()) {
        generation.models.retain(|m| m != &model);
        generation.models.insert(0, model);
    }

    if generation.api_key.is_none() {
        let key_var = match generation.provider {
            ProviderKind::Claude => Some(ENV_ANTHROPIC_API_KEY),
            ProviderKind::OpenAiCompatible => Some(ENV_OPENROUTER_API_KEY),
            ProviderKind::Offline => None,
        };
        generation.api_key = key_var
            .and_then(|name| var(name))
            .filter(|key| !key.trim().is_empty());
    }
}
