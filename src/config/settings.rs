use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::options::Scope;

pub const ENV_DATABASE: &str = "SITE_OPTIONS_DATABASE";
pub const ENV_SCOPE: &str = "SITE_OPTIONS_SCOPE";
pub const ENV_LOG_FILE: &str = "SITE_OPTIONS_LOG_FILE";

/// Process-wide settings read from `settings.toml` and the environment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Database file; defaults to `config.db` in the config directory
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Default scope for managers that are not given one
    #[serde(default = "default_scope")]
    pub scope: i64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_scope() -> i64 {
    Scope::DEFAULT.id()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            scope: default_scope(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("site-options")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".site-options")
        };
        Ok(config_dir)
    }

    pub fn get_settings_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("settings.toml"))
    }

    /// Load the settings file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::get_settings_path()?)?;
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Read a settings file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {:?}", path);

        if !path.exists() {
            debug!("Settings file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    /// Apply `SITE_OPTIONS_*` variables as returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = Some(PathBuf::from(database));
        }

        if let Some(scope) = lookup(ENV_SCOPE) {
            self.scope = scope
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", ENV_SCOPE, scope))?;
        }

        if let Some(log_file) = lookup(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(log_file));
        }

        Ok(())
    }

    pub fn default_scope(&self) -> Scope {
        Scope::new(self.scope)
    }

    /// Database file to open, creating the config directory for the default location.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(database) = &self.database {
            return Ok(database.clone());
        }

        let config_dir = Self::get_config_dir()?;
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.db"))
    }
}
