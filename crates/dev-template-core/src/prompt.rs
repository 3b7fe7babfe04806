//! Asking the user for values
//!
//! Everything interactive goes through the narrow [`Prompter`] capability, so
//! configuration mode and project requests can be driven by canned answers
//! in tests ([`ScriptedPrompter`]) or by terminal prompts in the binary.

use crate::config::Config;
use crate::environment::PackageSpec;
use crate::pipeline::plan::validate_name;
use crate::pipeline::ProjectRequest;
use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Rejects an answer with a message shown to the user
pub type Validator = fn(&str) -> Result<(), String>;

/// Synchronous source of user answers.
pub trait Prompter {
    /// Ask for text. An empty answer means `default`.
    fn ask_string(&mut self, prompt: &str, default: &str, validate: Validator) -> Result<String>;

    fn ask_bool(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Ask for an absolute path. An empty answer means `default`.
    fn ask_path(&mut self, prompt: &str, default: &Path) -> Result<PathBuf>;
}

/// Accept any answer
pub fn any_answer(_: &str) -> Result<(), String> {
    Ok(())
}

/// Accept a comma-delimited package list
pub fn package_list(input: &str) -> Result<(), String> {
    PackageSpec::parse_list(input)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Accept a usable project name
pub fn project_name(input: &str) -> Result<(), String> {
    validate_name(input.trim()).map_err(|e| e.to_string())
}

/// Accept an absolute path
pub fn absolute_path(input: &str) -> Result<(), String> {
    if Path::new(input.trim()).is_absolute() {
        Ok(())
    } else {
        Err(format!("'{}' is not an absolute path", input.trim()))
    }
}

/// Configuration mode: ask for every persisted setting, starting from `current`
pub fn configure(prompter: &mut dyn Prompter, current: &Config) -> Result<Config> {
    let packages = prompter.ask_string(
        "Default packages (comma separated, name or name==version)",
        &PackageSpec::join(&current.default_packages),
        package_list,
    )?;
    let project_path = prompter.ask_path("Default project path", &current.default_project_path)?;
    let create_setup_file = prompter.ask_bool("Create setup.py?", current.create_setup_file)?;
    let create_manifest_toml =
        prompter.ask_bool("Create pyproject.toml?", current.create_manifest_toml)?;

    Ok(Config {
        default_packages: PackageSpec::parse_list(&packages)?,
        default_project_path: project_path,
        create_setup_file,
        create_manifest_toml,
        ..current.clone()
    })
}

/// Values already given on the command line
#[derive(Debug, Clone, Default)]
pub struct ProjectOverrides {
    pub name: Option<String>,
    pub parent_dir: Option<PathBuf>,
    pub packages: Option<Vec<PackageSpec>>,
    /// Take configured defaults instead of asking
    pub yes: bool,
}

/// Build a project request, asking only for what `overrides` leaves open
pub fn request_project(
    prompter: &mut dyn Prompter,
    config: &Config,
    overrides: ProjectOverrides,
) -> Result<ProjectRequest> {
    let name = match overrides.name {
        Some(name) => name,
        None if overrides.yes => bail!("a project name is required when accepting defaults"),
        None => prompter.ask_string("Project name", "", project_name)?,
    };
    let name = name.trim().to_string();
    validate_name(&name)?;

    let parent_dir = match overrides.parent_dir {
        Some(dir) => dir,
        None if overrides.yes => config.default_project_path.clone(),
        None => prompter.ask_path("Create the project in", &config.default_project_path)?,
    };

    let packages = match overrides.packages {
        Some(packages) => packages,
        None if overrides.yes => config.default_packages.clone(),
        None => {
            let answer = prompter.ask_string(
                "Packages to install (comma separated)",
                &PackageSpec::join(&config.default_packages),
                package_list,
            )?;
            PackageSpec::parse_list(&answer)?
        }
    };

    Ok(ProjectRequest {
        name,
        parent_dir,
        packages,
    })
}

/// Prompter answering from a fixed queue, for tests and scripted runs.
///
/// An empty answer takes the default. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer.trim().to_string()),
            None => bail!("no scripted answer left for '{}'", prompt),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_string(&mut self, prompt: &str, default: &str, validate: Validator) -> Result<String> {
        let answer = self.next_answer(prompt)?;
        let answer = if answer.is_empty() {
            default.to_string()
        } else {
            answer
        };
        if let Err(message) = validate(&answer) {
            bail!("invalid answer to '{}': {}", prompt, message);
        }
        Ok(answer)
    }

    fn ask_bool(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = self.next_answer(prompt)?;
        match answer.to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" | "true" => Ok(true),
            "n" | "no" | "false" => Ok(false),
            other => bail!("invalid answer to '{}': expected yes or no, got '{}'", prompt, other),
        }
    }

    fn ask_path(&mut self, prompt: &str, default: &Path) -> Result<PathBuf> {
        let answer = self.next_answer(prompt)?;
        if answer.is_empty() {
            return Ok(default.to_path_buf());
        }
        if let Err(message) = absolute_path(&answer) {
            bail!("invalid answer to '{}': {}", prompt, message);
        }
        Ok(PathBuf::from(answer))
    }
}
