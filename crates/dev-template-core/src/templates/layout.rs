//! Template layout (`template.yaml`) types and parsing

use crate::config::Config;
use crate::error::TemplateError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Logical name of the layout file itself
pub const LAYOUT_TEMPLATE: &str = "template.yaml";

/// Logical name of the flat requirements manifest
pub const REQUIREMENTS_TEMPLATE: &str = "requirements.txt";

/// Logical name of the structured manifest document
pub const MANIFEST_TOML_TEMPLATE: &str = "pyproject.toml";

/// Logical names every layout must list
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "README.md",
    ".gitignore",
    REQUIREMENTS_TEMPLATE,
    MANIFEST_TOML_TEMPLATE,
    "src/__init__.py",
    "src/main.py",
    "tests/__init__.py",
    "tests/test_main.py",
];

/// Token replaced with the project name in paths and file content
pub const PROJECT_NAME_TOKEN: &str = "{{project_name}}";

/// Config switch a file depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Included when `create_setup_file` is on
    SetupFile,
    /// Included when `create_manifest_toml` is on
    ManifestToml,
}

impl Condition {
    pub fn is_enabled(&self, config: &Config) -> bool {
        match self {
            Condition::SetupFile => config.create_setup_file,
            Condition::ManifestToml => config.create_manifest_toml,
        }
    }
}

/// One file of the layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    /// Logical template name, relative to the templates directory
    pub name: String,

    /// Destination inside the project (defaults to the logical name)
    #[serde(default)]
    pub dest: Option<String>,

    /// Only render this file when the condition holds
    #[serde(default)]
    pub when: Option<Condition>,
}

impl LayoutFile {
    /// Get the destination pattern (falls back to name if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.name)
    }

    /// Destination relative to the project root for a given project name
    pub fn destination_for(&self, project_name: &str) -> PathBuf {
        expand_path(self.destination(), project_name)
    }

    pub fn is_enabled(&self, config: &Config) -> bool {
        self.when.map_or(true, |c| c.is_enabled(config))
    }
}

/// Project layout: directories to create and files to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLayout {
    /// Display name of the layout
    pub name: String,

    /// Description of what the layout provides
    #[serde(default)]
    pub description: String,

    /// Logical name of the package entry point (receives import lines)
    pub entry_point: String,

    /// Directories created before any file is written
    #[serde(default)]
    pub directories: Vec<String>,

    /// Files rendered into the project
    pub files: Vec<LayoutFile>,
}

impl TemplateLayout {
    /// Parse and validate a layout document
    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let layout: TemplateLayout = serde_yaml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check that every required name is listed and no path escapes the project
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut missing: Vec<String> = REQUIRED_TEMPLATES
            .iter()
            .filter(|name| self.find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if self.find(&self.entry_point).is_none() && !missing.contains(&self.entry_point) {
            missing.push(self.entry_point.clone());
        }
        if !missing.is_empty() {
            return Err(TemplateError::IncompleteLayout { missing });
        }

        let destinations = self
            .files
            .iter()
            .map(|f| f.destination())
            .chain(self.directories.iter().map(String::as_str));
        for dest in destinations {
            let raw = dest.replace(PROJECT_NAME_TOKEN, "project");
            if !is_inside_project(Path::new(&raw)) {
                return Err(TemplateError::UnsafeDestination(dest.to_string()));
            }
        }
        Ok(())
    }

    /// Find a file entry by logical name
    pub fn find(&self, name: &str) -> Option<&LayoutFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Files enabled under the given config
    pub fn files_for(&self, config: &Config) -> Vec<&LayoutFile> {
        self.files.iter().filter(|f| f.is_enabled(config)).collect()
    }

    /// Whether a logical name is rendered under the given config
    pub fn is_enabled(&self, name: &str, config: &Config) -> bool {
        self.find(name).is_some_and(|f| f.is_enabled(config))
    }

    /// Directories relative to the project root
    pub fn directories_for(&self, project_name: &str) -> Vec<PathBuf> {
        self.directories
            .iter()
            .map(|d| expand_path(d, project_name))
            .collect()
    }

    /// Destination of a logical name relative to the project root
    pub fn destination_of(&self, name: &str, project_name: &str) -> Option<PathBuf> {
        self.find(name).map(|f| f.destination_for(project_name))
    }
}

/// Expand `{{project_name}}` in a `/`-separated path pattern
pub fn expand_path(pattern: &str, project_name: &str) -> PathBuf {
    pattern
        .replace(PROJECT_NAME_TOKEN, project_name)
        .split('/')
        .filter(|part| !part.is_empty())
        .collect()
}

fn is_inside_project(path: &Path) -> bool {
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::BundledTemplates;

    fn bundled_layout() -> TemplateLayout {
        let content = BundledTemplates::python().get(LAYOUT_TEMPLATE).unwrap();
        TemplateLayout::parse(content).unwrap()
    }

    fn config(setup: bool, manifest: bool) -> Config {
        let mut config = Config::defaults(Path::new("/cfg"));
        config.create_setup_file = setup;
        config.create_manifest_toml = manifest;
        config
    }

    #[test]
    fn test_bundled_layout_parses() {
        let layout = bundled_layout();
        assert_eq!(layout.entry_point, "src/main.py");
        assert_eq!(
            layout.destination_of("src/main.py", "demo"),
            Some(PathBuf::from("src").join("demo").join("main.py"))
        );
        assert_eq!(
            layout.directories_for("demo"),
            vec![PathBuf::from("src").join("demo"), PathBuf::from("tests")]
        );
    }

    #[test]
    fn test_conditional_files() {
        let layout = bundled_layout();

        let names = |config: &Config| -> Vec<String> {
            layout
                .files_for(config)
                .into_iter()
                .map(|f| f.name.clone())
                .collect()
        };

        let toml_only = names(&config(false, true));
        assert!(!toml_only.iter().any(|n| n == "setup.py"));
        assert!(toml_only.iter().any(|n| n == "pyproject.toml"));
        assert!(toml_only.iter().any(|n| n == "README.md"));

        let setup_only = config(true, false);
        let files = names(&setup_only);
        assert!(files.iter().any(|n| n == "setup.py"));
        assert!(!files.iter().any(|n| n == "pyproject.toml"));
        assert!(!layout.is_enabled(MANIFEST_TOML_TEMPLATE, &setup_only));
    }

    #[test]
    fn test_incomplete_layout_rejected() {
        let content = r#"
name: tiny
entry_point: src/main.py
files:
  - name: README.md
  - name: src/main.py
"#;
        match TemplateLayout::parse(content) {
            Err(TemplateError::IncompleteLayout { missing }) => {
                assert!(missing.contains(&".gitignore".to_string()));
                assert!(!missing.contains(&"src/main.py".to_string()));
            }
            other => panic!("expected IncompleteLayout, got {other:?}"),
        }
    }

    #[test]
    fn test_escaping_destination_rejected() {
        let mut layout = bundled_layout();
        layout.files[0].dest = Some("../outside.md".to_string());
        assert!(matches!(
            layout.validate(),
            Err(TemplateError::UnsafeDestination(_))
        ));

        let mut layout = bundled_layout();
        layout.directories.push("/etc".to_string());
        assert!(matches!(
            layout.validate(),
            Err(TemplateError::UnsafeDestination(_))
        ));
    }
}
