//! Error types for scaffolding operations.
//!
//! Each component owns one error enum. The orchestrator wraps them in
//! [`ScaffoldError`], which always knows the pipeline [`Stage`] it came from
//! so the user can be told where a run stopped.
//!
//! Per-package install failures are not errors here: they are
//! values ([`crate::environment::FailureReason`]) carried in each
//! [`crate::environment::InstallResult`], never propagated with `?`.

use crate::pipeline::Stage;
use crate::templates::LAYOUT_TEMPLATE;
use std::path::PathBuf;
use thiserror::Error;

/// Unusable configuration or project request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A package specifier could not be parsed
    #[error("invalid package specifier '{spec}': {reason}")]
    InvalidPackageSpec {
        /// The offending specifier as written
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// The project name cannot be used as a directory or package name
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// A path that must be absolute was relative
    #[error("{what} must be an absolute path: {}", .path.display())]
    RelativePath { what: &'static str, path: PathBuf },

    /// The directory the project should be created in is not usable
    #[error("project parent directory does not exist or is not a directory: {}", .0.display())]
    MissingParentDir(PathBuf),

    /// No platform configuration directory could be determined
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Template resolution, layout, and copy failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Neither a user override nor a bundled default exists
    #[error(
        "template '{name}' not found in {} and no bundled default exists",
        .templates_dir.display()
    )]
    Missing { name: String, templates_dir: PathBuf },

    /// The template layout does not list every required logical name
    #[error("template layout is missing required entries: {}", .missing.join(", "))]
    IncompleteLayout { missing: Vec<String> },

    /// A layout destination escapes the project directory
    #[error("template destination '{0}' must be a relative path inside the project")]
    UnsafeDestination(String),

    /// The template layout could not be parsed
    #[error("invalid template layout: {0}")]
    Layout(#[from] serde_yaml::Error),

    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures creating the isolated environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// Something already lives at the environment path
    #[error("environment path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// No Python 3 interpreter was found on PATH
    #[error("no Python 3 interpreter found (install from https://python.org)")]
    InterpreterMissing,

    /// The environment tool could not be launched
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The environment tool ran but reported failure
    #[error("environment tool exited with code {code}: {stderr}")]
    ToolFailed { code: i32, stderr: String },
}

/// Failures merging install results into manifest documents.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The document has no dependencies declaration to merge into
    #[error("manifest has no usable dependencies declaration: {0}")]
    Shape(String),

    #[error("manifest is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A pipeline-aborting failure, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("configuration is unusable: {0}")]
    Config(#[from] ConfigError),

    /// The target project directory already exists
    #[error("project directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("environment creation failed: {0}")]
    EnvironmentCreation(#[from] EnvironmentError),

    #[error("manifest update failed: {0}")]
    Manifest(#[from] ManifestError),

    /// Anything not classified above; the detail goes to the debug log
    #[error("unexpected failure while {stage}; run with --debug for details")]
    Unexpected {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl ScaffoldError {
    /// The pipeline stage whose entry transition produced this error
    pub fn stage(&self) -> Stage {
        match self {
            ScaffoldError::Config(_) => Stage::ConfigValidated,
            ScaffoldError::DirectoryExists(_) => Stage::DirsCreated,
            // The layout is loaded while validating, before anything is created
            ScaffoldError::Template(
                TemplateError::Layout(_)
                | TemplateError::IncompleteLayout { .. }
                | TemplateError::UnsafeDestination(_),
            ) => Stage::ConfigValidated,
            ScaffoldError::Template(TemplateError::Missing { name, .. })
                if name == LAYOUT_TEMPLATE =>
            {
                Stage::ConfigValidated
            }
            ScaffoldError::Template(_) => Stage::TemplatesCopied,
            ScaffoldError::EnvironmentCreation(_) => Stage::EnvCreated,
            ScaffoldError::Manifest(_) => Stage::ManifestsWritten,
            ScaffoldError::Unexpected { stage, .. } => *stage,
        }
    }

    /// True when the failure was a missing template file
    pub fn is_template_missing(&self) -> bool {
        matches!(self, ScaffoldError::Template(TemplateError::Missing { .. }))
    }

    pub(crate) fn unexpected(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        ScaffoldError::Unexpected {
            stage,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_attribution() {
        let err = ScaffoldError::DirectoryExists(PathBuf::from("/tmp/demo"));
        assert_eq!(err.stage(), Stage::DirsCreated);

        let err = ScaffoldError::from(ManifestError::Shape("no table".to_string()));
        assert_eq!(err.stage(), Stage::ManifestsWritten);

        let err = ScaffoldError::unexpected(
            Stage::TemplatesCopied,
            std::io::Error::other("disk full"),
        );
        assert_eq!(err.stage(), Stage::TemplatesCopied);
    }

    #[test]
    fn test_unexpected_message_hides_detail() {
        let err = ScaffoldError::unexpected(
            Stage::DirsCreated,
            std::io::Error::other("EACCES on /secret/path"),
        );
        let message = err.to_string();
        assert!(message.contains("creating project directories"));
        assert!(!message.contains("/secret/path"));
    }

    #[test]
    fn test_template_missing_detection() {
        let err = ScaffoldError::from(TemplateError::Missing {
            name: "README.md".to_string(),
            templates_dir: PathBuf::from("/tmp/templates"),
        });
        assert!(err.is_template_missing());
        assert!(err.to_string().contains("README.md"));
    }
}
