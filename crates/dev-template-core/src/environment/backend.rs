//! Environment tool backends.
//!
//! The provisioner talks to the platform environment tool through
//! [`EnvironmentBackend`] so pipeline tests can substitute a scripted fake.
//! [`VenvBackend`] drives `python -m venv` and the environment's own `pip`.

use super::outcome::{FailureReason, InstallFailure};
use super::package::PackageSpec;
use super::runtime;
use crate::error::EnvironmentError;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One attempt at each environment operation; retries live in the provisioner.
#[allow(async_fn_in_trait)]
pub trait EnvironmentBackend {
    /// Create a fresh environment rooted at `env_path`
    async fn create(&self, env_path: &Path) -> Result<(), EnvironmentError>;

    /// Install one package and return the version that ended up installed
    async fn install(&self, env_path: &Path, spec: &PackageSpec) -> Result<String, InstallFailure>;
}

/// Backend using the standard library `venv` module and `pip`
#[derive(Debug, Clone)]
pub struct VenvBackend {
    interpreter: Option<String>,
}

impl VenvBackend {
    /// Use an explicit interpreter program
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: Some(interpreter.into()),
        }
    }

    /// Detect a Python 3 interpreter on PATH
    pub fn detect() -> Self {
        Self::from_runtime(&runtime::check_python())
    }

    /// Use the interpreter found by an earlier detection
    pub fn from_runtime(info: &runtime::RuntimeInfo) -> Self {
        if !info.available {
            log::warn!("No Python 3 interpreter found on PATH");
        }
        Self {
            interpreter: info.program.clone(),
        }
    }

    /// The interpreter that will create environments, if one was found
    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    async fn pip_show_version(python: &Path, name: &str) -> Option<String> {
        let output = Command::new(python)
            .args(["-m", "pip", "show", "--disable-pip-version-check", name])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_show_version(&String::from_utf8_lossy(&output.stdout))
    }
}

impl EnvironmentBackend for VenvBackend {
    async fn create(&self, env_path: &Path) -> Result<(), EnvironmentError> {
        let python = self
            .interpreter
            .as_deref()
            .ok_or(EnvironmentError::InterpreterMissing)?;

        log::info!("Creating environment: {} -m venv {}", python, env_path.display());
        let output = Command::new(python)
            .arg("-m")
            .arg("venv")
            .arg(env_path)
            .output()
            .await
            .map_err(|source| EnvironmentError::Spawn {
                program: python.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(EnvironmentError::ToolFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    async fn install(&self, env_path: &Path, spec: &PackageSpec) -> Result<String, InstallFailure> {
        let python = env_python(env_path);
        let requirement = spec.to_string();

        log::debug!("{} -m pip install {}", python.display(), requirement);
        let output = Command::new(&python)
            .args([
                "-m",
                "pip",
                "install",
                "--disable-pip-version-check",
                "--no-input",
            ])
            .arg(&requirement)
            .output()
            .await
            .map_err(|e| {
                InstallFailure::new(
                    FailureReason::Unknown,
                    format!("failed to launch {}: {}", python.display(), e),
                )
            })?;

        if !output.status.success() {
            let combined = format!(
                "{}\n{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(InstallFailure::from_output(&combined));
        }

        match Self::pip_show_version(&python, &spec.name).await {
            Some(version) => Ok(version),
            None => spec.version_constraint.clone().ok_or_else(|| {
                InstallFailure::new(
                    FailureReason::Unknown,
                    format!("installed {} but could not determine its version", spec.name),
                )
            }),
        }
    }
}

/// Path to the interpreter inside an environment
pub fn env_python(env_path: &Path) -> PathBuf {
    if cfg!(windows) {
        env_path.join("Scripts").join("python.exe")
    } else {
        env_path.join("bin").join("python")
    }
}

/// Pull the `Version:` field out of `pip show` output
fn parse_show_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
