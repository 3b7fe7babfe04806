//! Charm-style CLI prompts using cliclack

use crate::config::ConfigStore;
use crate::environment::backend::env_python;
use crate::environment::{
    check_python, EnvironmentProvisioner, FailureReason, InstallResult, PackageSpec, VenvBackend,
};
use crate::error::ScaffoldError;
use crate::observer::ScaffoldObserver;
use crate::pipeline::{ProjectScaffolder, ScaffoldReport, Stage};
use crate::prompt::{self, absolute_path, ProjectOverrides, Prompter, Validator};
use crate::templates::BundledTemplates;
use anyhow::Result;
use cliclack::ProgressBar;
use colored::Colorize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI arguments for creating a project
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name
    pub name: Option<String>,

    /// Directory the project is created in
    pub path: Option<PathBuf>,

    /// Packages to install instead of the configured defaults
    pub packages: Option<Vec<PackageSpec>>,

    /// Accept configured defaults for anything not given (non-interactive mode)
    pub yes: bool,
}

impl From<CreateArgs> for ProjectOverrides {
    fn from(args: CreateArgs) -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        ProjectOverrides {
            name: args.name,
            parent_dir: args.path.map(|p| {
                if p.is_absolute() {
                    p
                } else {
                    current_dir.join(p)
                }
            }),
            packages: args.packages,
            yes: args.yes,
        }
    }
}

/// [`Prompter`] backed by cliclack inputs
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn ask_string(&mut self, prompt: &str, default: &str, validate: Validator) -> Result<String> {
        let mut input = cliclack::input(prompt).validate(move |s: &String| validate(s));
        if !default.is_empty() {
            input = input.placeholder(default).default_input(default);
        }
        let answer: String = input.interact()?;
        Ok(answer.trim().to_string())
    }

    fn ask_bool(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(cliclack::confirm(prompt).initial_value(default).interact()?)
    }

    fn ask_path(&mut self, prompt: &str, default: &Path) -> Result<PathBuf> {
        let default = default.display().to_string();
        let answer: String = cliclack::input(prompt)
            .placeholder(&default)
            .default_input(&default)
            .validate(|s: &String| absolute_path(s))
            .interact()?;
        Ok(PathBuf::from(answer.trim()))
    }
}

/// Progress output for a pipeline run
#[derive(Default)]
pub struct TuiObserver {
    spinner: RefCell<Option<ProgressBar>>,
}

impl TuiObserver {
    /// Stop a running spinner after a failed stage
    pub fn abort(&self, stage: Stage) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.stop(format!("Failed while {}", stage));
        }
    }
}

impl ScaffoldObserver for TuiObserver {
    fn stage_started(&self, stage: Stage) {
        // Package progress prints its own lines
        if stage == Stage::PackagesInstalled {
            return;
        }
        let spinner = cliclack::spinner();
        spinner.start(format!("{}...", capitalize(stage.activity())));
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn stage_finished(&self, stage: Stage) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.stop(finished_message(stage));
        }
    }

    fn package_started(&self, spec: &PackageSpec, index: usize, total: usize) {
        let _ = cliclack::log::step(format!("Installing {} ({}/{})", spec, index + 1, total));
    }

    fn package_retrying(
        &self,
        spec: &PackageSpec,
        attempt: u32,
        max_attempts: u32,
        reason: FailureReason,
        delay: Duration,
    ) {
        let _ = cliclack::log::warning(format!(
            "{} failed ({}), attempt {}/{}; retrying in {}s",
            spec,
            reason,
            attempt,
            max_attempts,
            delay.as_secs()
        ));
    }

    fn package_finished(&self, result: &InstallResult) {
        let _ = match result.failure_reason() {
            None => cliclack::log::success(format!(
                "{} {}",
                result.spec().name,
                result.resolved_version().unwrap_or("unknown")
            )),
            Some(reason) => cliclack::log::error(format!("{}: {}", result.spec(), reason)),
        };
    }
}

/// Create a project interactively
pub async fn run(store: &ConfigStore, args: CreateArgs) -> Result<ScaffoldReport> {
    cliclack::intro("dev-template")?;

    let config = store.load()?;
    let written = store.ensure_templates_bootstrapped(&config, &BundledTemplates::python())?;
    if !written.is_empty() {
        cliclack::log::info(format!(
            "Added {} default template(s) to {}",
            written.len(),
            config.templates_dir.display()
        ))?;
    }

    let backend = check_runtime()?;

    let mut prompter = CliclackPrompter;
    let request = prompt::request_project(&mut prompter, &config, args.into())?;

    let observer = TuiObserver::default();
    let scaffolder = ProjectScaffolder::new(&config, EnvironmentProvisioner::new(backend))
        .with_observer(&observer);

    match scaffolder.run(&request).await {
        Ok(report) => {
            print_report(&report)?;
            Ok(report)
        }
        Err(err) => {
            observer.abort(err.stage());
            report_failure(&err)?;
            Err(err.into())
        }
    }
}

/// Configuration mode: prompt for every setting and persist it
pub fn configure(store: &ConfigStore) -> Result<()> {
    cliclack::intro("dev-template configuration")?;

    let current = store.load()?;
    let mut prompter = CliclackPrompter;
    let updated = prompt::configure(&mut prompter, &current)?;

    store.save(&updated)?;
    store.ensure_templates_bootstrapped(&updated, &BundledTemplates::python())?;

    cliclack::outro(format!("Saved {}", store.config_path().display()))?;
    Ok(())
}

fn check_runtime() -> Result<VenvBackend> {
    let spinner = cliclack::spinner();
    spinner.start("Checking Python...");

    let runtime = check_python();
    if runtime.available {
        spinner.stop(format!(
            "Detected {}",
            runtime.version.as_deref().unwrap_or(runtime.name)
        ));
    } else {
        spinner.stop("Python 3 not found");
        cliclack::log::warning(
            "Project files will be created, but the virtual environment cannot be.",
        )?;
    }
    Ok(VenvBackend::from_runtime(&runtime))
}

fn report_failure(err: &ScaffoldError) -> Result<()> {
    cliclack::log::error(format!("{}", err))?;
    if let ScaffoldError::EnvironmentCreation(_) | ScaffoldError::Manifest(_) = err {
        cliclack::log::info("Project files were kept so you can finish by hand.")?;
    }
    cliclack::outro_cancel(format!("Stopped while {}", err.stage()))?;
    Ok(())
}

fn print_report(report: &ScaffoldReport) -> Result<()> {
    let plan = &report.plan;

    if !report.results.is_empty() {
        println!();
        println!("  {}", "Packages".bold());
        println!();
        for result in &report.results {
            match result.failure_reason() {
                None => println!(
                    "  {} {}",
                    "✓".green(),
                    result.pinned_requirement().unwrap_or_default()
                ),
                Some(reason) => {
                    println!("  {} {} ({})", "✗".red(), result.spec(), reason.label().red());
                    println!("      {}", reason.advice().dimmed());
                }
            }
        }
    }

    println!();
    println!("  Next steps");
    println!();
    println!("  1.  cd {}", plan.root_path().display());
    println!("  2.  {}", activate_command(plan.env_path()).cyan());
    println!("  3.  python src/{}/main.py", plan.name());
    println!();

    if report.is_complete() {
        cliclack::outro(format!("{}. Happy coding!", report.summary()))?;
    } else {
        cliclack::outro(format!(
            "{}: {}",
            report.summary(),
            report.failure_lines().join(", ")
        ))?;
    }
    Ok(())
}

fn activate_command(env_path: &Path) -> String {
    let python = env_python(env_path);
    let bin = python.parent().unwrap_or(env_path);
    if cfg!(windows) {
        format!("{}", bin.join("activate").display())
    } else {
        format!("source {}", bin.join("activate").display())
    }
}

fn finished_message(stage: Stage) -> &'static str {
    match stage {
        Stage::ConfigValidated => "Configuration is valid",
        Stage::DirsCreated => "Created project directories",
        Stage::TemplatesCopied => "Copied templates",
        Stage::EnvCreated => "Created virtual environment",
        Stage::ManifestsWritten => "Updated dependency manifests",
        Stage::Init | Stage::PackagesInstalled | Stage::Done => "Done",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
