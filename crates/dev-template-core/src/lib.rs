//! dev-template core - Shared library for scaffolding Python projects
//!
//! This library turns a validated configuration plus a list of requested
//! packages into a new project on disk: a directory layout, rendered template
//! files, an isolated virtual environment with the packages installed, and
//! dependency manifests that reflect what was actually installed.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Components** - [`config::ConfigStore`], [`templates::TemplateResolver`],
//!   [`environment::EnvironmentProvisioner`] and the [`manifests`] writers
//! - **Layer 2: Orchestration** - [`pipeline::ProjectScaffolder`], an ordered state machine
//!   with per-transition cleanup hooks
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use dev_template_core::{ConfigStore, EnvironmentProvisioner, ProjectScaffolder, VenvBackend};
//!
//! let store = ConfigStore::from_env()?;
//! let config = store.load()?;
//! let provisioner = EnvironmentProvisioner::new(VenvBackend::detect());
//! let scaffolder = ProjectScaffolder::new(&config, provisioner);
//! let report = scaffolder.run(&request).await?;
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod manifests;
pub mod observer;
pub mod pipeline;
pub mod prompt;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{Config, ConfigStore};
pub use environment::{
    EnvironmentBackend, EnvironmentProvisioner, FailureReason, InstallResult, InstallStatus,
    PackageSpec, RetryConfig, VenvBackend,
};
pub use error::{ConfigError, EnvironmentError, ManifestError, ScaffoldError, TemplateError};
pub use observer::{NoObserver, ScaffoldObserver};
pub use pipeline::{ProjectPlan, ProjectRequest, ProjectScaffolder, ScaffoldReport, Stage};
pub use prompt::{Prompter, ScriptedPrompter};
pub use templates::{BundledTemplates, RenderContext, TemplateResolver, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
