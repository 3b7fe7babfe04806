//! Per-package install outcomes and failure classification.
//!
//! Failures are categorized so the provisioner can decide whether another
//! attempt could change the result, and so the final report can explain
//! each failure in a word.

use super::package::PackageSpec;
use std::fmt;

/// Why a package failed to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The package does not exist in the configured index
    NotFound,
    /// Connection, DNS or timeout failure (transient)
    NetworkError,
    /// The requested version cannot be installed for this interpreter/platform
    VersionConflict,
    /// Anything else
    Unknown,
}

impl FailureReason {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError)
    }

    /// Short label used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NetworkError => "network_error",
            Self::VersionConflict => "version_conflict",
            Self::Unknown => "unknown",
        }
    }

    /// Actionable advice for resolving this failure.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Check the package name on https://pypi.org",
            Self::NetworkError => "Check your internet connection and install it later",
            Self::VersionConflict => "Pick a version compatible with your Python interpreter",
            Self::Unknown => "Run with --debug and check the log for the installer output",
        }
    }

    /// Classify installer output (stdout and stderr combined).
    ///
    /// Network signatures are checked first: pip reports an unreachable
    /// index as "from versions: none", which would otherwise look like a
    /// missing package.
    pub fn classify(output: &str) -> Self {
        let lower = output.to_lowercase();

        if lower.contains("newconnectionerror")
            || lower.contains("connectionerror")
            || lower.contains("connection refused")
            || lower.contains("connection reset")
            || lower.contains("could not resolve")
            || lower.contains("temporary failure in name resolution")
            || lower.contains("name or service not known")
            || lower.contains("max retries exceeded")
            || lower.contains("read timed out")
            || lower.contains("timed out")
            || lower.contains("network is unreachable")
            || lower.contains("sslerror")
            || lower.contains("could not fetch url")
        {
            return Self::NetworkError;
        }

        // Releases filtered out for the interpreter still end in "from versions: none"
        if lower.contains("requires-python")
            || lower.contains("require a different python")
            || lower.contains("requires a different python")
            || lower.contains("is not a supported wheel on this platform")
        {
            return Self::VersionConflict;
        }

        if lower.contains("from versions: none")
            || lower.contains("404 client error")
            || lower.contains("no such package")
        {
            return Self::NotFound;
        }

        if lower.contains("no matching distribution found")
            || lower.contains("resolutionimpossible")
            || lower.contains("conflicting dependencies")
        {
            return Self::VersionConflict;
        }

        Self::Unknown
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A failed install attempt, before it is folded into an [`InstallResult`].
#[derive(Debug, Clone)]
pub struct InstallFailure {
    pub reason: FailureReason,
    /// Raw installer output, kept for the debug log
    pub detail: String,
}

impl InstallFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    /// Build a failure by classifying installer output
    pub fn from_output(output: &str) -> Self {
        Self::new(FailureReason::classify(output), output.trim())
    }
}

/// Whether an install succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Succeeded,
    Failed,
}

/// Outcome of installing one package. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    spec: PackageSpec,
    status: InstallStatus,
    failure_reason: Option<FailureReason>,
    resolved_version: Option<String>,
    attempts: u32,
}

impl InstallResult {
    pub fn succeeded(
        spec: PackageSpec,
        resolved_version: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            spec,
            status: InstallStatus::Succeeded,
            failure_reason: None,
            resolved_version: Some(resolved_version.into()),
            attempts,
        }
    }

    pub fn failed(spec: PackageSpec, reason: FailureReason, attempts: u32) -> Self {
        Self {
            spec,
            status: InstallStatus::Failed,
            failure_reason: Some(reason),
            resolved_version: None,
            attempts,
        }
    }

    pub fn spec(&self) -> &PackageSpec {
        &self.spec
    }

    pub fn status(&self) -> InstallStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == InstallStatus::Succeeded
    }

    /// Set only for failed results
    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }

    /// Set only for succeeded results
    pub fn resolved_version(&self) -> Option<&str> {
        self.resolved_version.as_deref()
    }

    /// How many install attempts were made
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `name==version` for a succeeded result
    pub fn pinned_requirement(&self) -> Option<String> {
        self.resolved_version
            .as_deref()
            .map(|v| format!("{}=={}", self.spec.name, v))
    }
}
