//! What a run will create, derived once from the request

use crate::environment::PackageSpec;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Names that cannot be used as a project directory on some platform
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "bin", "boot",
    "dev", "etc", "lib", "lib64", "proc", "run", "sbin", "srv", "sys", "tmp", "var",
];

/// Suffix of the environment directory name
pub const ENV_DIR_SUFFIX: &str = "_venv";

/// A project the user asked for, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRequest {
    pub name: String,
    /// Directory the project is created in
    pub parent_dir: PathBuf,
    /// Packages to install, in order
    pub packages: Vec<PackageSpec>,
}

/// Validated locations for one run. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPlan {
    name: String,
    root_path: PathBuf,
    env_path: PathBuf,
}

impl ProjectPlan {
    /// Validate the name and derive the project and environment paths.
    ///
    /// The environment is `<parent>/<name>_venv`, or `<root>/<name>_venv`
    /// when `venv_in_project` is set.
    pub fn new(name: &str, parent: PathBuf, venv_in_project: bool) -> Result<Self, ConfigError> {
        let name = name.trim();
        validate_name(name)?;
        if !parent.is_absolute() {
            return Err(ConfigError::RelativePath {
                what: "project path",
                path: parent,
            });
        }

        let root_path = parent.join(name);
        let env_dir = format!("{}{}", name, ENV_DIR_SUFFIX);
        let env_path = if venv_in_project {
            root_path.join(env_dir)
        } else {
            parent.join(env_dir)
        };

        Ok(Self {
            name: name.to_string(),
            root_path,
            env_path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    /// Directory the project is created in
    pub fn parent_dir(&self) -> &Path {
        self.root_path.parent().unwrap_or(&self.root_path)
    }
}

/// Check that `name` can be used as a project directory and package name
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name must not be a relative directory"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name must not contain path separators"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain whitespace"));
    }
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(invalid("name is reserved by the operating system"));
    }
    Ok(())
}
