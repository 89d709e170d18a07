use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Prefix of environment overrides, e.g. `BETBALANCE_ANALYTICS__RECENT_WINDOW=10`.
pub const ENV_PREFIX: &str = "BETBALANCE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration sources cannot be parsed or hold invalid values.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration by merging defaults, the TOML file, environment variables, and
    /// a JSON file with the same stem. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration sources cannot be parsed or hold invalid values.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::base(path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file(path.with_extension("json")))
            .extract()?;

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads configuration with a profile file (`Config.<profile>.toml`) layered over the base file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration sources cannot be parsed or hold invalid values.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::base(path)
            .merge(Toml::file(profile_path(path, profile)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file(path.with_extension("json")))
            .extract()?;

        config.validate()?;
        tracing::debug!(
            "Loaded configuration from {} with profile {}",
            path.display(),
            profile
        );
        Ok(config)
    }

    fn base(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path))
    }
}

fn profile_path(path: &Path, profile: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Config");
    path.with_file_name(format!("{stem}.{profile}.toml"))
}

/// Persistence of user settings, injected into whatever needs to read or change them.
pub trait ConfigStore: Send + Sync {
    /// Reads the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored configuration cannot be read or is invalid.
    fn load(&self) -> Result<AppConfig>;

    /// Replaces the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or cannot be written.
    fn save(&self, config: &AppConfig) -> Result<()>;
}

/// Configuration kept in a TOML file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<AppConfig> {
        ConfigLoader::load_from(&self.path)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        let contents = toml::to_string_pretty(config)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| CoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, contents).map_err(|source| CoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store for embedders and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RwLock<AppConfig>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<AppConfig> {
        Ok(self.config.read().clone())
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        *self.config.write() = config.clone();
        Ok(())
    }
}
