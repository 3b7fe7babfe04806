//! Persisted configuration
//!
//! The file on disk is a flat TOML table ([`RawConfig`]). Every field has a
//! default, so any subset of fields loads into a fully populated [`Config`].

pub mod paths;
pub mod store;

pub use store::ConfigStore;

use crate::environment::PackageSpec;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the templates directory inside the config directory
pub const TEMPLATES_DIR_NAME: &str = "templates";

/// Typed, fully populated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Packages offered by default for every new project
    pub default_packages: Vec<PackageSpec>,
    /// Directory new projects are created in
    pub default_project_path: PathBuf,
    /// Render `setup.py` into new projects
    pub create_setup_file: bool,
    /// Render and update `pyproject.toml` in new projects
    pub create_manifest_toml: bool,
    /// Directory holding user template overrides
    pub templates_dir: PathBuf,
    /// Place `<name>_venv` inside the project instead of next to it
    pub venv_in_project: bool,
}

impl Config {
    /// The compiled-in defaults for a given config directory
    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            default_packages: Vec::new(),
            default_project_path: paths::default_project_dir(),
            create_setup_file: false,
            create_manifest_toml: true,
            templates_dir: config_dir.join(TEMPLATES_DIR_NAME),
            venv_in_project: false,
        }
    }

    /// Build a typed config from the on-disk schema, filling gaps with defaults
    pub fn from_raw(raw: RawConfig, config_dir: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::defaults(config_dir);

        let default_project_path = non_empty(raw.project_path)
            .map(PathBuf::from)
            .unwrap_or(defaults.default_project_path);

        // Relative template dirs are taken relative to the config dir
        let templates_dir = non_empty(raw.templates_dir)
            .map(|dir| config_dir.join(dir))
            .unwrap_or(defaults.templates_dir);

        Ok(Self {
            default_packages: PackageSpec::parse_list(&raw.packages)?,
            default_project_path,
            create_setup_file: raw.create_setup_file,
            create_manifest_toml: raw.create_manifest_toml,
            templates_dir,
            venv_in_project: raw.venv_in_project,
        })
    }

    /// The on-disk representation of this config
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            packages: PackageSpec::join(&self.default_packages),
            project_path: Some(self.default_project_path.display().to_string()),
            create_setup_file: self.create_setup_file,
            create_manifest_toml: self.create_manifest_toml,
            templates_dir: Some(self.templates_dir.display().to_string()),
            venv_in_project: self.venv_in_project,
        }
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_project_path.is_absolute() {
            return Err(ConfigError::RelativePath {
                what: "project_path",
                path: self.default_project_path.clone(),
            });
        }
        if !self.templates_dir.is_absolute() {
            return Err(ConfigError::RelativePath {
                what: "templates_dir",
                path: self.templates_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Configuration file schema (`config.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Comma-delimited package specifiers, e.g. `pytest, black==24.1.0`
    pub packages: String,

    /// Absolute path new projects are created in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,

    pub create_setup_file: bool,

    pub create_manifest_toml: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,

    pub venv_in_project: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            packages: String::new(),
            project_path: None,
            create_setup_file: false,
            create_manifest_toml: true,
            templates_dir: None,
            venv_in_project: false,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
