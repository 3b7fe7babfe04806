//! Loading and saving `config.toml`

use super::{paths, Config, RawConfig};
use crate::error::ConfigError;
use crate::templates::BundledTemplates;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Reads and writes the persisted configuration in one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform config directory
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(paths::config_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration.
    ///
    /// A missing, non-UTF-8 or malformed file yields the defaults with a
    /// warning. A well-formed file with a bad package specifier is a
    /// [`ConfigError`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = self.config_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "No configuration at {}, using defaults (run with --config to create one)",
                    path.display()
                );
                return Ok(Config::defaults(&self.dir));
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!(
                    "Ignoring configuration at {} that is not valid UTF-8, using defaults",
                    path.display()
                );
                return Ok(Config::defaults(&self.dir));
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let raw: RawConfig = match toml::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!(
                    "Ignoring malformed configuration at {}, using defaults: {}",
                    path.display(),
                    e
                );
                return Ok(Config::defaults(&self.dir));
            }
        };

        let config = Config::from_raw(raw, &self.dir)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Persist the configuration atomically.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over `config.toml`, so the old file survives a crash.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir).map_err(|source| ConfigError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.config_path();
        let content = toml::to_string_pretty(&config.to_raw())?;
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Copy every bundled template missing from the user templates directory.
    ///
    /// Existing user files are never overwritten. Returns the logical names
    /// that were written.
    pub fn ensure_templates_bootstrapped(
        &self,
        config: &Config,
        bundled: &BundledTemplates,
    ) -> Result<Vec<String>, ConfigError> {
        let mut written = Vec::new();

        for (name, content) in bundled.iter() {
            let target = config.templates_dir.join(name);
            if target.exists() {
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&target, content).map_err(|source| ConfigError::Write {
                path: target.clone(),
                source,
            })?;
            written.push(name.to_string());
        }

        if !written.is_empty() {
            log::info!(
                "Bootstrapped {} template(s) into {}",
                written.len(),
                config.templates_dir.display()
            );
        }
        Ok(written)
    }
}
