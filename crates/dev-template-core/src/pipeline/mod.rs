//! The scaffolding pipeline
//!
//! [`ProjectScaffolder::run`] walks the [`Stage`]s in order. When the
//! transition into a stage fails, that stage's [`Cleanup`] hook decides what
//! is undone: nothing before the filesystem is touched, the whole project
//! tree while only directories and templates exist, and nothing once the
//! environment is being built.

pub mod plan;
pub mod report;
pub mod stage;

pub use plan::{ProjectPlan, ProjectRequest};
pub use report::ScaffoldReport;
pub use stage::{Cleanup, Stage};

use crate::config::Config;
use crate::environment::{EnvironmentBackend, EnvironmentProvisioner, InstallResult};
use crate::error::{ConfigError, ScaffoldError};
use crate::manifests::{write_manifest_toml, write_requirements};
use crate::observer::{NoObserver, ScaffoldObserver};
use crate::templates::{
    copy_templates, write_file, RenderContext, TemplateLayout, TemplateResolver,
    MANIFEST_TOML_TEMPLATE, REQUIREMENTS_TEMPLATE,
};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Drives one project from request to finished tree.
pub struct ProjectScaffolder<'a, B> {
    config: &'a Config,
    resolver: TemplateResolver,
    provisioner: EnvironmentProvisioner<B>,
    observer: &'a dyn ScaffoldObserver,
}

/// Side effects of the current run that a cleanup hook may undo
#[derive(Debug, Default)]
struct RunState {
    /// Project root created by this run
    created_root: Option<PathBuf>,
}

impl<'a, B: EnvironmentBackend> ProjectScaffolder<'a, B> {
    pub fn new(config: &'a Config, provisioner: EnvironmentProvisioner<B>) -> Self {
        Self {
            config,
            resolver: TemplateResolver::from_config(config),
            provisioner,
            observer: &NoObserver,
        }
    }

    /// Use a specific resolver instead of the configured templates dir
    pub fn with_resolver(mut self, resolver: TemplateResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ScaffoldObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run the whole pipeline.
    ///
    /// Install failures are part of the returned report. Any error names the
    /// stage it came from, and that stage's cleanup has already run.
    pub async fn run(&self, request: &ProjectRequest) -> Result<ScaffoldReport, ScaffoldError> {
        let mut state = RunState::default();
        match self.drive(request, &mut state).await {
            Ok(report) => Ok(report),
            Err(err) => {
                let stage = err.stage();
                match &err {
                    ScaffoldError::Unexpected { source, .. } => {
                        log::error!("Failed while {}: {:?}", stage, source)
                    }
                    other => log::error!("Failed while {}: {}", stage, other),
                }
                self.cleanup(stage, &state).await;
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        request: &ProjectRequest,
        state: &mut RunState,
    ) -> Result<ScaffoldReport, ScaffoldError> {
        self.observer.stage_started(Stage::ConfigValidated);
        let (plan, layout) = self.validate(request)?;
        self.observer.stage_finished(Stage::ConfigValidated);

        self.observer.stage_started(Stage::DirsCreated);
        self.create_dirs(&plan, &layout, state).await?;
        self.observer.stage_finished(Stage::DirsCreated);

        self.observer.stage_started(Stage::TemplatesCopied);
        let files = self.render_templates(&plan, &layout).await?;
        self.observer.stage_finished(Stage::TemplatesCopied);

        self.observer.stage_started(Stage::EnvCreated);
        self.provisioner.create_environment(&plan).await?;
        self.observer.stage_finished(Stage::EnvCreated);

        self.observer.stage_started(Stage::PackagesInstalled);
        let results = self
            .provisioner
            .install_all(&plan, &request.packages, self.observer)
            .await;
        self.observer.stage_finished(Stage::PackagesInstalled);

        self.observer.stage_started(Stage::ManifestsWritten);
        let manifests = self.write_manifests(&plan, &layout, &results).await?;
        self.observer.stage_finished(Stage::ManifestsWritten);

        self.observer.stage_finished(Stage::Done);
        Ok(ScaffoldReport {
            plan,
            files,
            results,
            manifests,
        })
    }

    /// `init -> config_validated`: no filesystem side effects
    fn validate(
        &self,
        request: &ProjectRequest,
    ) -> Result<(ProjectPlan, TemplateLayout), ScaffoldError> {
        self.config.validate()?;
        let plan = ProjectPlan::new(
            &request.name,
            request.parent_dir.clone(),
            self.config.venv_in_project,
        )?;
        if !plan.parent_dir().is_dir() {
            return Err(ConfigError::MissingParentDir(plan.parent_dir().to_path_buf()).into());
        }
        let layout = self.resolver.load_layout()?;
        log::debug!(
            "Planned {} at {} (environment {})",
            plan.name(),
            plan.root_path().display(),
            plan.env_path().display()
        );
        Ok((plan, layout))
    }

    /// `config_validated -> dirs_created`
    async fn create_dirs(
        &self,
        plan: &ProjectPlan,
        layout: &TemplateLayout,
        state: &mut RunState,
    ) -> Result<(), ScaffoldError> {
        let root = plan.root_path();
        if fs::try_exists(root)
            .await
            .map_err(|e| ScaffoldError::unexpected(Stage::DirsCreated, e))?
        {
            return Err(ScaffoldError::DirectoryExists(root.to_path_buf()));
        }

        fs::create_dir(root)
            .await
            .map_err(|e| ScaffoldError::unexpected(Stage::DirsCreated, e))?;
        state.created_root = Some(root.to_path_buf());

        for dir in layout.directories_for(plan.name()) {
            fs::create_dir_all(root.join(&dir))
                .await
                .map_err(|e| ScaffoldError::unexpected(Stage::DirsCreated, e))?;
        }
        Ok(())
    }

    /// `dirs_created -> templates_copied`
    async fn render_templates(
        &self,
        plan: &ProjectPlan,
        layout: &TemplateLayout,
    ) -> Result<Vec<PathBuf>, ScaffoldError> {
        let templates = self.resolver.plan(layout, self.config, plan.name())?;
        let ctx = RenderContext::new(plan.name());
        Ok(copy_templates(&self.resolver, &templates, plan.root_path(), &ctx).await?)
    }

    /// `packages_installed -> manifests_written`
    ///
    /// Also re-renders the entry point with imports for what installed.
    async fn write_manifests(
        &self,
        plan: &ProjectPlan,
        layout: &TemplateLayout,
        results: &[InstallResult],
    ) -> Result<Vec<PathBuf>, ScaffoldError> {
        let unexpected = |e: std::io::Error| ScaffoldError::unexpected(Stage::ManifestsWritten, e);
        let mut written = Vec::new();

        let requirements = self.destination(plan, layout, REQUIREMENTS_TEMPLATE);
        let existing = read_or_empty(&requirements).await.map_err(unexpected)?;
        fs::write(&requirements, write_requirements(results, &existing))
            .await
            .map_err(unexpected)?;
        written.push(requirements);

        if layout.is_enabled(MANIFEST_TOML_TEMPLATE, self.config) {
            let manifest = self.destination(plan, layout, MANIFEST_TOML_TEMPLATE);
            let existing = read_or_empty(&manifest).await.map_err(unexpected)?;
            let merged = write_manifest_toml(results, &existing)?;
            if merged != existing {
                fs::write(&manifest, merged).await.map_err(unexpected)?;
            }
            written.push(manifest);
        }

        let modules: Vec<String> = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.spec().module_name())
            .collect();
        if !modules.is_empty() {
            let entry_point = self.destination(plan, layout, &layout.entry_point);
            let ctx = RenderContext::new(plan.name()).with_imports(modules);
            let content = self
                .resolver
                .resolve(&layout.entry_point)
                .and_then(|source| self.resolver.render(&source, &ctx))
                .map_err(|e| ScaffoldError::unexpected(Stage::ManifestsWritten, e))?;
            write_file(&entry_point, &content)
                .await
                .map_err(|e| ScaffoldError::unexpected(Stage::ManifestsWritten, e))?;
        }

        Ok(written)
    }

    fn destination(&self, plan: &ProjectPlan, layout: &TemplateLayout, name: &str) -> PathBuf {
        let relative = layout
            .destination_of(name, plan.name())
            .unwrap_or_else(|| PathBuf::from(name));
        plan.root_path().join(relative)
    }

    /// Run the cleanup hook for a failed transition into `stage`
    async fn cleanup(&self, stage: Stage, state: &RunState) {
        match stage.failure_cleanup() {
            Cleanup::Nothing => {}
            Cleanup::RemoveProjectTree => {
                if let Some(root) = &state.created_root {
                    remove_project_tree(root).await;
                }
            }
            Cleanup::KeepFiles => {
                if let Some(root) = &state.created_root {
                    log::info!("Leaving {} in place for manual recovery", root.display());
                }
            }
        }
    }
}

async fn remove_project_tree(root: &Path) {
    match fs::remove_dir_all(root).await {
        Ok(()) => log::info!("Rolled back {}", root.display()),
        Err(e) => log::warn!("Could not remove {}: {}", root.display(), e),
    }
}

async fn read_or_empty(path: &Path) -> std::io::Result<String> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}
