//! Isolated environment provisioning
//!
//! This module provides:
//! - Package specifiers and per-package install outcomes
//! - Failure classification and the retry/backoff policy
//! - Python interpreter detection
//! - The `venv`/`pip` backend and the provisioner that drives it

pub mod backend;
pub mod outcome;
pub mod package;
pub mod provisioner;
pub mod retry;
pub mod runtime;

pub use backend::{EnvironmentBackend, VenvBackend};
pub use outcome::{FailureReason, InstallFailure, InstallResult, InstallStatus};
pub use package::{normalize_name, requirement_name, PackageSpec};
pub use provisioner::EnvironmentProvisioner;
pub use retry::RetryConfig;
pub use runtime::{check_python, RuntimeInfo};
